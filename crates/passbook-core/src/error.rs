//! Error types for the passbook-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the passbook library.
///
/// Only [`PassbookError::DocumentUnreadable`] is produced by the parsing
/// pipeline itself; every other extraction problem degrades to fewer
/// transactions plus diagnostics on the outcome.
#[derive(Error, Debug)]
pub enum PassbookError {
    /// The input could not be opened or decoded as a document at all.
    #[error("document unreadable: {}: {reason}", path.display())]
    DocumentUnreadable { path: PathBuf, reason: String },

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// A format or mode name that is not one of the known layout families.
    #[error("unknown format: {0}")]
    UnknownFormat(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PassbookError {
    /// Wrap a lower-level failure as an unreadable document.
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DocumentUnreadable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error means the document itself could not be decoded.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::DocumentUnreadable { .. } | Self::Pdf(_))
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to walk the page content for text and word positions.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and the configured password does not open it.
    #[error("PDF is encrypted")]
    Encrypted,
}

/// Result type for the passbook library.
pub type Result<T> = std::result::Result<T, PassbookError>;
