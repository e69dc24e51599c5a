//! Data models: documents, formats, records, and configuration.

pub mod config;
pub mod document;
pub mod format;
pub mod record;
pub mod transaction;

pub use config::{ClassifierConfig, CoordinateConfig, ExtractionConfig, PassbookConfig, PdfConfig, SplitRule};
pub use document::{Document, Page, Table, Word};
pub use format::{FormatIdentifier, FormatSource, Mode};
pub use record::{AmountStyle, RawRecord, fields};
pub use transaction::{Amounts, ParseOutcome, StrategyFamily, StrategyId, Transaction};
