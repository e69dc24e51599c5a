//! Bank statement format detection and transaction extraction.

pub mod classifier;
pub mod events;
pub mod normalizer;
mod orchestrator;
pub mod registry;
pub mod rules;
pub mod strategies;

pub use classifier::{FormatClassifier, classify_text};
pub use events::{EventSink, NullSink, ParseEvent, TracingSink};
pub use normalizer::{normalize, normalize_record};
pub use orchestrator::Parser;
pub use registry::{StrategyChain, StrategyRegistry};
pub use strategies::{ExtractContext, ExtractionStrategy, Strategy};
