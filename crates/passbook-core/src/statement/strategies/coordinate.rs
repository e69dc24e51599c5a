//! Coordinate strategy: rebuilds a table from positioned words.
//!
//! Words are grouped into rows by vertical midpoint, column boundaries are
//! found in the gaps between horizontal midpoints, and the resulting grid is
//! read through the same row assembly as detected tables.

use tracing::debug;

use crate::models::{
    CoordinateConfig, Document, FormatIdentifier, RawRecord, StrategyFamily, StrategyId, Word,
};

use super::layouts::TableLayout;
use super::rows::RowSettings;
use super::table::GridReader;
use super::{ExtractContext, ExtractionStrategy};

/// Virtual-table extraction from word coordinates.
#[derive(Debug, Clone)]
pub struct CoordinateStrategy {
    format: FormatIdentifier,
    layout: TableLayout,
    settings: RowSettings,
    config: CoordinateConfig,
}

impl CoordinateStrategy {
    pub fn new(format: FormatIdentifier, settings: RowSettings, config: CoordinateConfig) -> Self {
        Self {
            format,
            layout: TableLayout::for_format(format),
            settings,
            config,
        }
    }

    /// Build the cell grid of one page.
    pub fn virtual_table(&self, words: &[Word]) -> Vec<Vec<String>> {
        let rows = group_rows(words, self.config.row_tolerance);
        let bounds = cluster_columns(&rows, self.config.min_column_gap, self.config.column_support);
        let width = bounds.len() + 1;

        rows.iter()
            .map(|row| {
                let mut cells = vec![String::new(); width];
                for word in row {
                    let col = bounds.iter().take_while(|b| **b < word.mid_x()).count();
                    let cell = &mut cells[col];
                    if !cell.is_empty() {
                        cell.push(' ');
                    }
                    cell.push_str(&word.text);
                }
                cells
            })
            .collect()
    }
}

impl ExtractionStrategy for CoordinateStrategy {
    fn id(&self) -> StrategyId {
        StrategyId::new(StrategyFamily::Coordinate, self.format)
    }

    fn extract(&self, document: &Document, ctx: &mut ExtractContext) -> Vec<RawRecord> {
        let mut records = Vec::new();
        let mut grid = GridReader::new(&self.layout, &self.settings);

        for page in &document.pages {
            if page.words.is_empty() {
                continue;
            }
            let table = self.virtual_table(&page.words);
            debug!(
                "Page {}: virtual table of {} rows x {} columns",
                page.index,
                table.len(),
                table.first().map_or(0, Vec::len)
            );
            let page_records = grid.read(&table, page.index, ctx);
            ctx.page_records(page.index, page_records.len());
            records.extend(page_records);
        }

        records
    }
}

/// Group words into rows, top to bottom, each row ordered left to right.
///
/// A word joins the current row when its vertical midpoint is within
/// `tolerance` of the midpoint of the row's first word.
pub fn group_rows(words: &[Word], tolerance: f32) -> Vec<Vec<&Word>> {
    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by(|a, b| a.mid_y().total_cmp(&b.mid_y()).then(a.left().total_cmp(&b.left())));

    let mut rows: Vec<Vec<&Word>> = Vec::new();
    let mut anchor = f32::NEG_INFINITY;
    for word in sorted {
        match rows.last_mut() {
            Some(row) if (word.mid_y() - anchor).abs() <= tolerance => row.push(word),
            _ => {
                anchor = word.mid_y();
                rows.push(vec![word]);
            }
        }
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.left().total_cmp(&b.left()));
    }
    rows
}

/// Column boundaries for a page, ascending.
///
/// Candidate boundaries sit halfway across gaps wider than `min_gap`
/// between consecutive word midpoints. A candidate is kept when at least
/// `support` of the rows have no word crossing it.
pub fn cluster_columns(rows: &[Vec<&Word>], min_gap: f32, support: f32) -> Vec<f32> {
    let mut mids: Vec<f32> = rows.iter().flatten().map(|w| w.mid_x()).collect();
    if mids.len() < 2 {
        return Vec::new();
    }
    mids.sort_by(f32::total_cmp);

    let total = rows.len() as f32;
    mids.windows(2)
        .filter(|pair| pair[1] - pair[0] > min_gap)
        .map(|pair| (pair[0] + pair[1]) / 2.0)
        .filter(|boundary| {
            let clear = rows
                .iter()
                .filter(|row| !row.iter().any(|w| w.spans_x(*boundary)))
                .count() as f32;
            clear / total >= support
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;
    use pretty_assertions::assert_eq;

    /// A word 4 units wide centred at `mid_x` on the line at `y`.
    fn word(text: &str, mid_x: f32, y: f32) -> Word {
        Word::new(text, mid_x - 2.0, y, mid_x + 2.0, y + 8.0)
    }

    #[test]
    fn test_three_columns_from_midpoints() {
        let words: Vec<Word> = [10.0, 12.0, 50.0, 52.0, 90.0, 92.0]
            .iter()
            .enumerate()
            .map(|(i, x)| word("w", *x, (i % 2) as f32 * 20.0))
            .collect();
        let rows = group_rows(&words, 3.0);
        assert_eq!(rows.len(), 2);

        for gap in [2.5, 10.0, 37.5] {
            let bounds = cluster_columns(&rows, gap, 0.5);
            assert_eq!(bounds.len(), 2, "gap threshold {}", gap);
        }
        assert_eq!(cluster_columns(&rows, 38.0, 0.5).len(), 0);

        // 2-unit gaps fall inside words on both rows and are vetoed
        assert_eq!(cluster_columns(&rows, 1.0, 0.5).len(), 2);
    }

    #[test]
    fn test_straddling_words_veto_a_boundary() {
        let words = vec![
            word("a", 10.0, 0.0),
            Word::new("wide narration", 20.0, 0.0, 80.0, 8.0),
            word("b", 10.0, 20.0),
            Word::new("wide narration", 20.0, 20.0, 80.0, 28.0),
            word("c", 10.0, 40.0),
            word("x", 40.0, 40.0),
            word("y", 70.0, 40.0),
        ];
        let rows = group_rows(&words, 3.0);
        assert_eq!(rows.len(), 3);

        // gaps at 25 and 60 are crossed by the wide word on two of three rows
        assert!(cluster_columns(&rows, 15.0, 0.5).is_empty());
        assert_eq!(cluster_columns(&rows, 15.0, 0.3), vec![25.0, 60.0]);
    }

    #[test]
    fn test_rows_group_within_tolerance() {
        let words = vec![
            word("right", 80.0, 101.5),
            word("left", 10.0, 100.0),
            word("next", 10.0, 112.0),
        ];
        let rows = group_rows(&words, 3.0);
        let texts: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(|w| w.text.as_str()).collect())
            .collect();
        assert_eq!(texts, vec![vec!["left", "right"], vec!["next"]]);
    }

    #[test]
    fn test_extracts_records_from_words() {
        let mut words = Vec::new();
        let lines: [(&[&str], f32); 4] = [
            (&["Date", "Narration", "Amount", "Balance"], 0.0),
            (&["01/04/2024", "UPI/SHOP", "50.00", "950.00"], 20.0),
            (&["", "GROCERY", "", ""], 32.0),
            (&["02/04/2024", "NEFT", "25.00", "925.00"], 52.0),
        ];
        for (cells, y) in lines {
            for (cell, x) in cells.iter().zip([20.0, 120.0, 220.0, 320.0]) {
                if !cell.is_empty() {
                    words.push(word(cell, x, y));
                }
            }
        }
        let doc = Document::new(vec![Page::from_text(0, "").with_words(words)]);
        let strategy = CoordinateStrategy::new(
            FormatIdentifier::Axis,
            RowSettings::default(),
            CoordinateConfig::default(),
        );
        let mut ctx = ExtractContext::new(strategy.id());
        let records = strategy.extract(&doc, &mut ctx);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Description"), Some("UPI/SHOP GROCERY"));
        assert_eq!(records[0].get("Amount"), Some("50.00"));
        assert_eq!(records[1].get("Balance"), Some("925.00"));
        assert_eq!(ctx.strategy().to_string(), "coordinate:axis");
    }
}
