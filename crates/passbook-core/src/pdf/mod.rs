//! Layout sources: turn input files into pages of text, words, and tables.

mod extractor;

pub use extractor::{PdfLayoutSource, Segment, build_ruled_table, text_lines};

use std::path::Path;

use crate::error::Result;
use crate::models::Document;

/// Trait for document layout sources.
pub trait LayoutSource {
    /// Open a document. Fails with `DocumentUnreadable` when the file
    /// cannot be read or decoded at all.
    fn open(&self, path: &Path) -> Result<Document>;
}
