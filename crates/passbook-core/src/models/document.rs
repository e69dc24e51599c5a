//! Page-oriented document model consumed by the extraction engine.
//!
//! A [`Document`] is produced once by a [`LayoutSource`](crate::pdf::LayoutSource)
//! and is read-only from then on. Coordinates are page units with `y`
//! growing downward (top of the page is `0`).

use serde::{Deserialize, Serialize};

/// A whole statement: ordered pages, first page first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Pages in statement order.
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a document from its pages.
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Text of the first `n` pages joined with newlines.
    pub fn prefix_text(&self, n: usize) -> String {
        self.pages
            .iter()
            .take(n)
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content from a single page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-based).
    pub index: usize,
    /// Extracted text, one visual line per text line.
    pub text: String,
    /// Positioned word tokens in content order.
    pub words: Vec<Word>,
    /// Tables detected natively by the layout source.
    pub tables: Vec<Table>,
}

impl Page {
    /// Create a text-only page.
    pub fn from_text(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Set the word tokens.
    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        self.words = words;
        self
    }

    /// Add a detected table.
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }
}

/// A word token with its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Word text.
    pub text: String,
    /// Bounding box (left, top, right, bottom).
    pub bbox: [f32; 4],
}

impl Word {
    /// Create a word from text and box edges.
    pub fn new(text: impl Into<String>, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            text: text.into(),
            bbox: [left, top, right, bottom],
        }
    }

    pub fn left(&self) -> f32 {
        self.bbox[0]
    }

    pub fn top(&self) -> f32 {
        self.bbox[1]
    }

    pub fn right(&self) -> f32 {
        self.bbox[2]
    }

    pub fn bottom(&self) -> f32 {
        self.bbox[3]
    }

    /// Horizontal midpoint.
    pub fn mid_x(&self) -> f32 {
        (self.bbox[0] + self.bbox[2]) / 2.0
    }

    /// Vertical midpoint.
    pub fn mid_y(&self) -> f32 {
        (self.bbox[1] + self.bbox[3]) / 2.0
    }

    /// Check if the word's horizontal extent covers `x`.
    pub fn spans_x(&self, x: f32) -> bool {
        self.bbox[0] < x && x < self.bbox[2]
    }
}

/// A table: rows of cell strings, empty cells allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table from rows of cells.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a table from string slices.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest row length.
    pub fn num_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_midpoints() {
        let word = Word::new("100.00", 10.0, 20.0, 30.0, 28.0);
        assert_eq!(word.mid_x(), 20.0);
        assert_eq!(word.mid_y(), 24.0);
        assert!(word.spans_x(15.0));
        assert!(!word.spans_x(30.0));
    }

    #[test]
    fn test_prefix_text_bounds_pages() {
        let doc = Document::new(vec![
            Page::from_text(0, "first"),
            Page::from_text(1, "second"),
        ]);
        assert_eq!(doc.prefix_text(1), "first");
        assert_eq!(doc.prefix_text(5), "first\nsecond");
    }

    #[test]
    fn test_table_from_rows() {
        let table = Table::from_rows([vec!["a", "b"], vec!["c"]]);
        assert_eq!(table.num_cols(), 2);
        assert_eq!(table.rows[1], vec!["c".to_string()]);
    }
}
