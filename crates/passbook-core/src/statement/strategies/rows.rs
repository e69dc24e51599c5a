//! Row assembly shared by the table and coordinate strategies.
//!
//! Turns a grid of cell strings into raw records: locates the header,
//! repairs merged cells, folds continuation rows into the previous
//! record's description, and drops boilerplate and malformed rows.

use regex::Regex;
use tracing::trace;

use crate::error::{PassbookError, Result};
use crate::models::{RawRecord, SplitRule, fields};
use crate::statement::events::ParseEvent;
use crate::statement::rules::{is_amount, is_date};

use super::ExtractContext;
use super::layouts::{ColumnMap, is_header_row};

/// A compiled merged-cell split rule.
#[derive(Debug, Clone)]
pub struct CellSplitter {
    column: usize,
    head: Regex,
    tail: Regex,
}

impl CellSplitter {
    pub fn compile(rule: &SplitRule) -> Result<Self> {
        let anchored = |pattern: &str| {
            Regex::new(&format!("^(?:{})$", pattern))
                .map_err(|e| PassbookError::Config(format!("split rule: {}", e)))
        };
        Ok(Self {
            column: rule.column,
            head: anchored(&rule.head)?,
            tail: anchored(&rule.tail)?,
        })
    }

    /// Every distinct (head, tail) split of a cell where both halves match.
    pub fn candidates(&self, cell: &str) -> Vec<(String, String)> {
        let cell = cell.trim();
        let mut found: Vec<(String, String)> = Vec::new();
        for (i, _) in cell.char_indices().skip(1) {
            let head = cell[..i].trim();
            let tail = cell[i..].trim();
            if head.is_empty() || tail.is_empty() {
                continue;
            }
            if self.head.is_match(head) && self.tail.is_match(tail) {
                let pair = (head.to_string(), tail.to_string());
                if !found.contains(&pair) {
                    found.push(pair);
                }
            }
        }
        found
    }

    /// Split the configured cell of a row in place.
    ///
    /// One candidate is applied as is. Several candidates are resolved to
    /// the longest tail and reported as ambiguous.
    fn apply(&self, row: &mut Vec<String>, page: usize, ctx: &mut ExtractContext) {
        let Some(cell) = row.get(self.column) else {
            return;
        };
        let mut candidates = self.candidates(cell);
        if candidates.is_empty() {
            return;
        }
        if candidates.len() > 1 {
            ctx.push(ParseEvent::AmbiguousSplit {
                page,
                cell: cell.clone(),
                candidates: candidates.len(),
            });
            candidates.sort_by_key(|(_, tail)| std::cmp::Reverse(tail.len()));
        }
        let (head, tail) = candidates.swap_remove(0);
        row[self.column] = head;
        row.insert(self.column + 1, tail);
    }
}

/// Row repair settings for one strategy.
#[derive(Debug, Clone)]
pub struct RowSettings {
    pub separator: String,
    pub splitter: Option<CellSplitter>,
}

impl Default for RowSettings {
    fn default() -> Self {
        Self {
            separator: " ".to_string(),
            splitter: None,
        }
    }
}

/// Index of the header row: the first row reading like a header above the
/// first dated row, else row 0 unless row 0 already carries a date (a table
/// continued from the previous page).
pub fn find_header(rows: &[Vec<String>]) -> Option<usize> {
    let first = rows.first()?;
    rows.iter()
        .take_while(|r| !r.iter().any(|c| is_date(c)))
        .position(|r| is_header_row(r))
        .or_else(|| (!first.iter().any(|c| is_date(c))).then_some(0))
}

/// How a data row is handled.
#[derive(Debug, PartialEq)]
enum RowKind {
    Blank,
    Continuation,
    Record,
    Boilerplate,
    Malformed { column: String, value: String },
}

/// Assembles records from data rows of one page.
pub struct RowAssembler<'a> {
    map: &'a ColumnMap,
    settings: &'a RowSettings,
    page: usize,
    records: Vec<RawRecord>,
    open: bool,
}

impl<'a> RowAssembler<'a> {
    pub fn new(map: &'a ColumnMap, settings: &'a RowSettings, page: usize) -> Self {
        Self {
            map,
            settings,
            page,
            records: Vec::new(),
            open: false,
        }
    }

    /// Feed data rows (header already removed).
    pub fn push_rows<'r>(
        &mut self,
        rows: impl IntoIterator<Item = &'r Vec<String>>,
        ctx: &mut ExtractContext,
    ) {
        for row in rows {
            self.push_row(row, ctx);
        }
    }

    pub fn push_row(&mut self, row: &[String], ctx: &mut ExtractContext) {
        let mut row = row.to_vec();
        if let Some(splitter) = &self.settings.splitter {
            splitter.apply(&mut row, self.page, ctx);
        }

        let bound = self.map.bind(&row);
        match self.classify(&row, &bound) {
            RowKind::Blank => self.open = false,
            RowKind::Continuation => {
                let text = value_of(&bound, fields::DESCRIPTION).unwrap_or_default();
                if let Some(last) = self.records.last_mut() {
                    last.append(fields::DESCRIPTION, text, &self.settings.separator);
                }
            }
            RowKind::Record => {
                let mut record = RawRecord::new(self.map.style, self.page);
                for (field, value) in bound {
                    record.set(field, value);
                }
                self.records.push(record);
                self.open = true;
            }
            RowKind::Boilerplate => {
                trace!("Discarding boilerplate row on page {}: {:?}", self.page, row);
                if value_of(&bound, fields::DATE).is_some_and(|d| !d.is_empty()) {
                    self.open = false;
                }
            }
            RowKind::Malformed { column, value } => {
                ctx.push(ParseEvent::RowDropped {
                    page: self.page,
                    column,
                    value,
                });
                self.open = false;
            }
        }
    }

    fn classify(&self, row: &[String], bound: &[(String, String)]) -> RowKind {
        if row.iter().all(|c| c.trim().is_empty()) {
            return RowKind::Blank;
        }

        let date = value_of(bound, fields::DATE).unwrap_or_default();
        let money: Vec<(&str, &str)> = bound
            .iter()
            .filter(|(f, v)| self.map.money_fields().any(|m| m == f.as_str()) && !v.is_empty())
            .map(|(f, v)| (f.as_str(), v.as_str()))
            .collect();

        if !is_date(date) {
            if date.is_empty() && self.open {
                return RowKind::Continuation;
            }
            return RowKind::Boilerplate;
        }

        if money.is_empty() && self.open && self.map.money_fields().next().is_some() {
            return RowKind::Continuation;
        }

        if let Some((column, value)) = money.iter().find(|(_, v)| !is_amount(v)) {
            return RowKind::Malformed {
                column: column.to_string(),
                value: value.to_string(),
            };
        }

        RowKind::Record
    }

    pub fn finish(self) -> Vec<RawRecord> {
        self.records
    }
}

fn value_of<'b>(bound: &'b [(String, String)], field: &str) -> Option<&'b str> {
    bound
        .iter()
        .find(|(f, _)| f == field)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmountStyle, FormatIdentifier, StrategyFamily, StrategyId};
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn ctx() -> ExtractContext {
        ExtractContext::new(StrategyId::new(StrategyFamily::Table, FormatIdentifier::Standard))
    }

    fn assemble(map: &ColumnMap, settings: &RowSettings, rows: &[Vec<String>]) -> (Vec<RawRecord>, ExtractContext) {
        let mut ctx = ctx();
        let mut assembler = RowAssembler::new(map, settings, 0);
        assembler.push_rows(rows, &mut ctx);
        (assembler.finish(), ctx)
    }

    #[test]
    fn test_continuation_joins_description() {
        let map = ColumnMap::new(
            &["Date", "Description", "Debit", "Credit"],
            &[],
            AmountStyle::Split,
        );
        let rows = vec![
            row(&["01/04/2024", "Transfer", "", "100.00"]),
            row(&["", "to ABC Ltd", "", ""]),
        ];
        let (records, _) = assemble(&map, &RowSettings::default(), &rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Description"), Some("Transfer to ABC Ltd"));
        assert_eq!(records[0].get("Credit"), Some("100.00"));
        assert_eq!(records[0].get("Debit"), Some(""));
    }

    #[test]
    fn test_blank_row_closes_record() {
        let map = ColumnMap::new(&["Date", "Description"], &["Amount"], AmountStyle::Single);
        let rows = vec![
            row(&["01/04/2024", "Salary", "100.00"]),
            row(&["", "", ""]),
            row(&["", "Footer text", ""]),
        ];
        let (records, _) = assemble(&map, &RowSettings::default(), &rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Description"), Some("Salary"));
    }

    #[test]
    fn test_dated_row_without_amounts() {
        let map = ColumnMap::new(&["Date", "Description"], &["Amount"], AmountStyle::Single);

        // open record: continuation
        let rows = vec![
            row(&["01/04/2024", "NEFT", "10.00"]),
            row(&["02/04/2024", "ref 991", ""]),
        ];
        let (records, _) = assemble(&map, &RowSettings::default(), &rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Description"), Some("NEFT ref 991"));

        // nothing open: starts a record
        let rows = vec![row(&["02/04/2024", "Opening", ""])];
        let (records, _) = assemble(&map, &RowSettings::default(), &rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Amount"), Some(""));
    }

    #[test]
    fn test_boilerplate_discarded() {
        let map = ColumnMap::new(&["Date", "Description"], &["Amount"], AmountStyle::Single);
        let rows = vec![
            row(&["Statement of account", "", ""]),
            row(&["01/04/2024", "UPI", "5.00"]),
        ];
        let (records, _) = assemble(&map, &RowSettings::default(), &rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Date"), Some("01/04/2024"));
    }

    #[test]
    fn test_malformed_amount_drops_row() {
        let map = ColumnMap::new(&["Date", "Description"], &["Amount", "Balance"], AmountStyle::Single);
        let rows = vec![
            row(&["01/04/2024", "UPI", "5.00", "95.00"]),
            row(&["02/04/2024", "ATM", "N/A", "90.00"]),
            row(&["", "dangling", "", ""]),
            row(&["03/04/2024", "POS", "1.00", "89.00"]),
        ];
        let (records, ctx) = assemble(&map, &RowSettings::default(), &rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Description"), Some("UPI"));
        assert_eq!(records[1].get("Description"), Some("POS"));
        assert_eq!(
            ctx.events(),
            &[ParseEvent::RowDropped {
                page: 0,
                column: "Amount".to_string(),
                value: "N/A".to_string(),
            }]
        );
    }

    #[test]
    fn test_serial_date_split() {
        let map = ColumnMap::new(
            &["Sl_No", "Date", "Description", "Ref_No"],
            &["Withdrawal", "Deposit", "Balance"],
            AmountStyle::Split,
        );
        let settings = RowSettings {
            separator: " ".to_string(),
            splitter: Some(CellSplitter::compile(&SplitRule::serial_date()).unwrap()),
        };
        let rows = vec![
            row(&["12 01-04-2024", "IMPS", "REF1", "", "250.00", "1,250.00"]),
            row(&["13", "02-04-2024", "ATM", "REF2", "50.00", "", "1,200.00"]),
        ];
        let (records, ctx) = assemble(&map, &settings, &rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Sl_No"), Some("12"));
        assert_eq!(records[0].get("Date"), Some("01-04-2024"));
        assert_eq!(records[0].get("Deposit"), Some("250.00"));
        assert_eq!(records[1].get("Sl_No"), Some("13"));
        assert_eq!(records[1].get("Description"), Some("ATM"));
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn test_ambiguous_split_uses_longest_tail() {
        let splitter = CellSplitter::compile(&SplitRule {
            column: 0,
            head: r"\d+".to_string(),
            tail: r"\d+".to_string(),
        })
        .unwrap();
        assert_eq!(splitter.candidates("123").len(), 2);

        let mut ctx = ctx();
        let mut cells = row(&["123", "x"]);
        splitter.apply(&mut cells, 2, &mut ctx);
        assert_eq!(cells, row(&["1", "23", "x"]));
        assert!(matches!(
            ctx.events()[0],
            ParseEvent::AmbiguousSplit { page: 2, candidates: 2, .. }
        ));
    }

    #[test]
    fn test_find_header() {
        let rows = vec![
            row(&["Account Statement", ""]),
            row(&["Date", "Balance"]),
            row(&["01/04/2024", "10.00"]),
        ];
        assert_eq!(find_header(&rows), Some(1));
        assert_eq!(find_header(&rows[..1]), Some(0));
        assert_eq!(find_header(&rows[2..]), None);
        assert_eq!(find_header(&[]), None);
    }

    #[test]
    fn test_find_header_ignores_dated_rows() {
        let rows = vec![
            row(&["01/04/2024", "UPI/PAY", "10.00", "90.00"]),
            row(&["02/04/2024", "Reversal of txn amount", "10.00", "100.00"]),
        ];
        assert_eq!(find_header(&rows), None);
    }
}
