//! Pattern strategy: anchor lines and continuations over raw page text.

use tracing::trace;

use crate::models::{Document, FormatIdentifier, RawRecord, StrategyFamily, StrategyId, fields};
use crate::statement::rules::{CHEQUE_NO, is_amount_token, is_date, leading_date};

use super::layouts::PatternLayout;
use super::{ExtractContext, ExtractionStrategy};

/// Parses statement lines without consulting table geometry.
#[derive(Debug, Clone)]
pub struct PatternStrategy {
    format: FormatIdentifier,
    layout: PatternLayout,
    separator: String,
}

impl PatternStrategy {
    pub fn new(format: FormatIdentifier, separator: impl Into<String>) -> Self {
        Self {
            format,
            layout: PatternLayout::for_format(format),
            separator: separator.into(),
        }
    }

    /// Parse an anchor line into a record, or `None` if it is not one.
    ///
    /// An anchor starts with a date and carries at least one amount token.
    pub fn parse_anchor(&self, line: &str, page: usize) -> Option<RawRecord> {
        let date = leading_date(line)?;
        let tokens = merge_markers(line.split_whitespace().collect());
        let layout = &self.layout;

        let mut record = RawRecord::new(layout.style, page).with(fields::DATE, date);
        let mut start = 1;
        let mut end = tokens.len();

        if let Some(field) = layout.secondary_date {
            if tokens.get(start).is_some_and(|t| is_date(t)) {
                record.set(field, tokens[start].clone());
                start += 1;
            }
        }

        if layout.cheque {
            match tokens.get(start).map(String::as_str) {
                Some(t) if CHEQUE_NO.is_match(t) => {
                    record.set(fields::CHEQUE, t);
                    start += 1;
                }
                Some("-") => start += 1,
                _ => {}
            }
        }

        if let Some(field) = layout.trailing_ref {
            if end > start && !is_amount_token(&tokens[end - 1]) {
                record.set(field, tokens[end - 1].clone());
                end -= 1;
            }
        }

        let mut found = 0;
        for field in layout.amounts.iter().rev() {
            if end > start && is_amount_token(&tokens[end - 1]) {
                record.set(*field, tokens[end - 1].clone());
                end -= 1;
                found += 1;
            } else {
                break;
            }
        }
        if found == 0 {
            return None;
        }

        record.set(fields::DESCRIPTION, tokens[start..end].join(" "));
        Some(record)
    }
}

/// Glue standalone Cr/Dr markers onto the amount before them.
fn merge_markers(raw: Vec<&str>) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::with_capacity(raw.len());
    for token in raw {
        let is_marker = matches!(token, "Cr" | "Dr" | "CR" | "DR" | "(Cr)" | "(Dr)");
        match tokens.last_mut() {
            Some(prev) if is_marker && is_amount_token(prev) => {
                prev.push(' ');
                prev.push_str(token);
            }
            _ => tokens.push(token.to_string()),
        }
    }
    tokens
}

impl ExtractionStrategy for PatternStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::new(StrategyFamily::Pattern, self.format)
    }

    fn extract(&self, document: &Document, ctx: &mut ExtractContext) -> Vec<RawRecord> {
        let mut records: Vec<RawRecord> = Vec::new();
        let mut lead_in = String::new();

        for page in &document.pages {
            let before = records.len();
            let mut open = false;

            for line in page.text.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // anchors win over boilerplate markers inside their narration
                if let Some(mut record) = self.parse_anchor(line, page.index) {
                    if !lead_in.is_empty() {
                        let description = record.get(fields::DESCRIPTION).unwrap_or_default();
                        let joined = format!("{} {}", lead_in, description);
                        record.set(fields::DESCRIPTION, joined.trim());
                        lead_in.clear();
                    }
                    records.push(record);
                    open = true;
                } else if self.layout.is_boilerplate(line) {
                    continue;
                } else if self.layout.is_lead_in(line) {
                    if !lead_in.is_empty() {
                        lead_in.push(' ');
                    }
                    lead_in.push_str(line);
                } else if open {
                    if let Some(last) = records.last_mut() {
                        last.append(fields::DESCRIPTION, line, &self.separator);
                    }
                } else {
                    trace!("Ignoring line before first anchor on page {}: {}", page.index, line);
                }
            }

            ctx.page_records(page.index, records.len() - before);
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmountStyle, Page};
    use pretty_assertions::assert_eq;

    fn extract(format: FormatIdentifier, pages: &[&str]) -> Vec<RawRecord> {
        let doc = Document::new(
            pages
                .iter()
                .enumerate()
                .map(|(i, text)| Page::from_text(i, *text))
                .collect(),
        );
        let strategy = PatternStrategy::new(format, " ");
        let mut ctx = ExtractContext::new(strategy.id());
        strategy.extract(&doc, &mut ctx)
    }

    #[test]
    fn test_standard_anchor_and_continuation() {
        let records = extract(
            FormatIdentifier::Standard,
            &["Account Statement\n\
               01/04/2024 Salary ACME Corp 500.00 1,500.00\n\
               for March\n\
               02/04/2024 ATM WDL 200.00 1,300.00"],
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Description"), Some("Salary ACME Corp for March"));
        assert_eq!(records[0].get("Amount"), Some("500.00"));
        assert_eq!(records[0].get("Balance"), Some("1,500.00"));
        assert_eq!(records[0].style, AmountStyle::Single);
        assert_eq!(records[1].get("Description"), Some("ATM WDL"));
    }

    #[test]
    fn test_boilerplate_words_inside_anchor_are_kept() {
        let records = extract(
            FormatIdentifier::Standard,
            &["01/04/2024 UPI/Page Industries 500.00 1,000.00\n\
               Page 1 of 3\n\
               02/04/2024 ATM 100.00 900.00\n\
               Closing Balance 900.00"],
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Description"), Some("UPI/Page Industries"));
        assert_eq!(records[1].get("Description"), Some("ATM"));
    }

    #[test]
    fn test_date_without_amount_is_not_anchor() {
        let strategy = PatternStrategy::new(FormatIdentifier::Standard, " ");
        assert!(strategy.parse_anchor("01/04/2024 Statement period", 0).is_none());
        assert!(strategy.parse_anchor("Total 500.00", 0).is_none());
    }

    #[test]
    fn test_continuation_stops_at_page_end() {
        let records = extract(
            FormatIdentifier::Standard,
            &["01/04/2024 UPI 10.00 90.00", "orphan line\n02/04/2024 POS 5.00 85.00"],
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Description"), Some("UPI"));
        assert_eq!(records[1].page, 1);
    }

    #[test]
    fn test_jk_line_layout() {
        let records = extract(
            FormatIdentifier::Jk,
            &["Value Date Txn Date Cheque Description Withdrawal Deposit Balance\n\
               NEFT/HDFC0001/\n\
               01/04/2024 01/04/2024 - SALARY APR 5,000.00 15,000.00 TRF991\n\
               02/04/2024 02/04/2024 123456 CHQ PAID 1,000.00 0.00 14,000.00 CHQ77\n\
               ref cont\n\
               Page 1 of 2"],
        );
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.get("Description"), Some("NEFT/HDFC0001/ SALARY APR"));
        assert_eq!(first.get("Txn_Date"), Some("01/04/2024"));
        assert_eq!(first.get("Ref_No"), Some("TRF991"));
        assert_eq!(first.get("Balance"), Some("15,000.00"));
        assert_eq!(first.get("Deposit"), Some("5,000.00"));
        assert_eq!(first.get("Withdrawal"), None);
        assert_eq!(first.get("Cheque"), None);

        let second = &records[1];
        assert_eq!(second.get("Cheque"), Some("123456"));
        assert_eq!(second.get("Withdrawal"), Some("1,000.00"));
        assert_eq!(second.get("Description"), Some("CHQ PAID ref cont"));
    }

    #[test]
    fn test_cr_dr_markers_stay_with_amount() {
        let strategy = PatternStrategy::new(FormatIdentifier::Axis, " ");
        let record = strategy
            .parse_anchor("05-04-2024 IMPS/P2A/123 250.00 4,750.00 Cr", 0)
            .unwrap();
        assert_eq!(record.get("Balance"), Some("4,750.00 Cr"));
        assert_eq!(record.get("Amount"), Some("250.00"));
        assert_eq!(record.get("Description"), Some("IMPS/P2A/123"));
    }
}
