//! Core library for bank statement extraction.
//!
//! This crate provides:
//! - PDF layout extraction (text lines, positioned words, ruled tables)
//! - Statement layout classification (KOTAK, JK, HDFC, AXIS, YESBANK, STANDARD)
//! - Table, line-pattern, and coordinate extraction strategies with fallback
//! - Normalization of per-layout records into canonical transactions

pub mod error;
pub mod models;
pub mod pdf;
pub mod statement;

pub use error::{PassbookError, PdfError, Result};
pub use models::{
    Amounts, Document, FormatIdentifier, FormatSource, Mode, Page, ParseOutcome, PassbookConfig,
    RawRecord, StrategyId, Table, Transaction, Word,
};
pub use pdf::{LayoutSource, PdfLayoutSource};
pub use statement::{EventSink, ParseEvent, Parser, TracingSink};
