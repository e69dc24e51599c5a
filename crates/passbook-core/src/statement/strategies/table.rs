//! Table strategy: positional column mapping over detected tables.

use tracing::debug;

use crate::models::{Document, FormatIdentifier, RawRecord, StrategyFamily, StrategyId};

use super::layouts::{ColumnMap, TableLayout, is_header_row};
use super::rows::{RowAssembler, RowSettings, find_header};
use super::{ExtractContext, ExtractionStrategy};

/// Maps rows of each detected table through a format's column layout.
#[derive(Debug, Clone)]
pub struct TableStrategy {
    format: FormatIdentifier,
    layout: TableLayout,
    settings: RowSettings,
}

impl TableStrategy {
    pub fn new(format: FormatIdentifier, settings: RowSettings) -> Self {
        Self {
            format,
            layout: TableLayout::for_format(format),
            settings,
        }
    }
}

impl ExtractionStrategy for TableStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::new(StrategyFamily::Table, self.format)
    }

    fn extract(&self, document: &Document, ctx: &mut ExtractContext) -> Vec<RawRecord> {
        let mut records = Vec::new();
        let mut grid = GridReader::new(&self.layout, &self.settings);

        for page in &document.pages {
            let before = records.len();
            for table in &page.tables {
                records.extend(grid.read(&table.rows, page.index, ctx));
            }
            if !page.tables.is_empty() {
                ctx.page_records(page.index, records.len() - before);
            }
        }

        records
    }
}

/// Reads grids of cells through a table layout.
///
/// Header-driven layouts remember the last header seen so a table continued
/// on the next page without its header keeps the same columns.
pub(super) struct GridReader<'a> {
    layout: &'a TableLayout,
    settings: &'a RowSettings,
    last_header: Option<(usize, ColumnMap)>,
}

impl<'a> GridReader<'a> {
    pub(super) fn new(layout: &'a TableLayout, settings: &'a RowSettings) -> Self {
        Self {
            layout,
            settings,
            last_header: None,
        }
    }

    pub(super) fn read(
        &mut self,
        rows: &[Vec<String>],
        page: usize,
        ctx: &mut ExtractContext,
    ) -> Vec<RawRecord> {
        let Some((map, data)) = self.resolve(rows) else {
            return Vec::new();
        };
        if !map.has_date() {
            debug!("Skipping table on page {}: no date column", page);
            return Vec::new();
        }

        let mut assembler = RowAssembler::new(&map, self.settings, page);
        assembler.push_rows(data, ctx);
        assembler.finish()
    }

    fn resolve<'r>(&mut self, rows: &'r [Vec<String>]) -> Option<(ColumnMap, &'r [Vec<String>])> {
        let first = rows.first()?;
        match self.layout {
            TableLayout::Fixed(map) => {
                let data = match find_header(rows) {
                    Some(header) => &rows[header + 1..],
                    None => rows,
                };
                Some((map.clone(), data))
            }
            TableLayout::FromHeader => {
                let width = first.len();
                if let Some((w, map)) = &self.last_header {
                    if *w == width && !is_header_row(first) {
                        return Some((map.clone(), rows));
                    }
                }
                let map = ColumnMap::from_header(first);
                self.last_header = Some((width, map.clone()));
                Some((map, &rows[1..]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Page, Table};
    use crate::statement::normalizer::normalize;
    use pretty_assertions::assert_eq;

    fn ctx(strategy: &TableStrategy) -> ExtractContext {
        ExtractContext::new(strategy.id())
    }

    #[test]
    fn test_standard_header_mapping() {
        let doc = Document::new(vec![Page::from_text(0, "").with_table(Table::from_rows([
            vec!["Date", "Particulars", "Amount", "Balance"],
            vec!["01/04/2024", "Salary", "500.00", "1500.00"],
            vec!["", "April", "", ""],
        ]))]);
        let strategy = TableStrategy::new(FormatIdentifier::Standard, RowSettings::default());
        let mut ctx = ctx(&strategy);
        let records = strategy.extract(&doc, &mut ctx);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Description"), Some("Salary April"));
        assert_eq!(records[0].get("Amount"), Some("500.00"));
        assert_eq!(records[0].get("Balance"), Some("1500.00"));
        assert_eq!(ctx.strategy().to_string(), "table:standard");
    }

    #[test]
    fn test_header_reused_for_continued_table() {
        let doc = Document::new(vec![
            Page::from_text(0, "").with_table(Table::from_rows([
                vec!["Date", "Narration", "Debit", "Credit", "Balance"],
                vec!["01/04/2024", "ATM", "100.00", "", "900.00"],
            ])),
            Page::from_text(1, "").with_table(Table::from_rows([vec![
                "02/04/2024",
                "NEFT",
                "",
                "50.00",
                "950.00",
            ]])),
        ]);
        let strategy = TableStrategy::new(FormatIdentifier::Standard, RowSettings::default());
        let records = strategy.extract(&doc, &mut ctx(&strategy));

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("Credit"), Some("50.00"));
        assert_eq!(records[1].page, 1);
    }

    #[test]
    fn test_fixed_layout_skips_title_rows() {
        let doc = Document::new(vec![Page::from_text(0, "").with_table(Table::from_rows([
            vec!["Statement for A/c 123", "", "", ""],
            vec!["Tran Date", "Particulars", "Amount(INR)", "Balance(INR)"],
            vec!["01-04-2024", "UPI/PAY", "", "120.00"],
            vec!["02-04-2024", "IMPS", "20.00", "100.00"],
        ]))]);
        let strategy = TableStrategy::new(FormatIdentifier::Axis, RowSettings::default());
        let records = strategy.extract(&doc, &mut ctx(&strategy));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Amount"), Some(""));
        assert_eq!(records[1].get("Description"), Some("IMPS"));
    }

    #[test]
    fn test_headerless_table_keeps_rows_that_mention_header_words() {
        let doc = Document::new(vec![Page::from_text(0, "").with_table(Table::from_rows([
            vec!["01-04-2024", "UPI/PAY", "20.00", "120.00"],
            vec!["02-04-2024", "IMPS", "20.00", "100.00"],
            vec!["03-04-2024", "Reversal of txn amount", "20.00", "120.00"],
            vec!["05-04-2024", "ATM", "10.00", "110.00"],
        ]))]);
        let strategy = TableStrategy::new(FormatIdentifier::Axis, RowSettings::default());
        let records = strategy.extract(&doc, &mut ctx(&strategy));

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].get("Date"), Some("01-04-2024"));
        assert_eq!(records[2].get("Description"), Some("Reversal of txn amount"));
    }

    #[test]
    fn test_continued_description_reaches_transaction() {
        let doc = Document::new(vec![Page::from_text(0, "").with_table(Table::from_rows([
            vec!["Date", "Description", "Debit", "Credit"],
            vec!["01/04/2024", "Transfer", "", "100.00"],
            vec!["", "to ABC Ltd", "", ""],
        ]))]);
        let strategy = TableStrategy::new(FormatIdentifier::Standard, RowSettings::default());
        let records = strategy.extract(&doc, &mut ctx(&strategy));
        let txns = normalize(records, FormatIdentifier::Standard);

        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description.as_deref(), Some("Transfer to ABC Ltd"));
        assert_eq!(txns[0].field("Credit"), Some("100.00"));
        assert_eq!(txns[0].field("Debit"), Some(""));
    }

    #[test]
    fn test_no_tables_yields_nothing() {
        let doc = Document::new(vec![Page::from_text(0, "01/04/2024 UPI 10.00 20.00")]);
        let strategy = TableStrategy::new(FormatIdentifier::Hdfc, RowSettings::default());
        assert!(strategy.extract(&doc, &mut ctx(&strategy)).is_empty());
    }
}
