//! Fallback orchestration: classify, then run the format's chain until a
//! strategy's output is accepted.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::models::{
    Document, FormatIdentifier, FormatSource, Mode, ParseOutcome, PassbookConfig,
};
use crate::pdf::LayoutSource;

use super::classifier::FormatClassifier;
use super::events::{EventSink, ParseEvent, TracingSink};
use super::normalizer::normalize;
use super::registry::{StrategyChain, StrategyRegistry};
use super::strategies::{ExtractContext, ExtractionStrategy};

/// Statement parser.
///
/// Holds no per-document state; one instance can serve many documents and
/// threads.
pub struct Parser {
    classifier: FormatClassifier,
    registry: StrategyRegistry,
    min_transactions: usize,
    sink: Arc<dyn EventSink>,
}

impl Parser {
    /// Create a parser from configuration, logging events through `tracing`.
    pub fn new(config: &PassbookConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: FormatClassifier::new(config.classifier.prefix_pages),
            registry: StrategyRegistry::new(config)?,
            min_transactions: config.extraction.min_transactions.max(1),
            sink: Arc::new(TracingSink),
        })
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Classify a document without extracting.
    pub fn classify(&self, document: &Document) -> FormatIdentifier {
        self.classifier.classify(document)
    }

    /// The chain that would run for a format.
    pub fn chain(&self, format: FormatIdentifier) -> StrategyChain {
        self.registry.chain(format)
    }

    /// Open a file through a layout source and parse it.
    pub fn parse_path(
        &self,
        source: &impl LayoutSource,
        path: &Path,
        mode: Mode,
    ) -> Result<ParseOutcome> {
        let document = source.open(path)?;
        Ok(self.parse(&document, mode))
    }

    /// Parse a document. Never fails: an exhausted chain yields an empty
    /// outcome flagged `exhausted`.
    pub fn parse(&self, document: &Document, mode: Mode) -> ParseOutcome {
        let start = Instant::now();

        let (format, format_source) = match mode {
            Mode::Auto => (self.classify(document), FormatSource::Detected),
            Mode::Fixed(format) => (format, FormatSource::Override),
        };
        self.sink.emit(&ParseEvent::Classified {
            format,
            source: format_source,
        });

        let chain = self.registry.chain(format);
        let mut outcome = ParseOutcome {
            format,
            format_source,
            strategy: None,
            attempts: 0,
            exhausted: false,
            transactions: Vec::new(),
            warnings: Vec::new(),
            processing_time_ms: 0,
        };

        for strategy in chain.iter() {
            let id = strategy.id();
            outcome.attempts += 1;
            self.sink.emit(&ParseEvent::StrategyAttempted {
                strategy: id,
                attempt: outcome.attempts,
            });

            let mut ctx = ExtractContext::new(id);
            let records = strategy.extract(document, &mut ctx);
            let events = ctx.into_events();
            for event in &events {
                self.sink.emit(event);
            }

            if records.len() < self.min_transactions {
                self.sink.emit(&ParseEvent::StrategyRejected {
                    strategy: id,
                    records: records.len(),
                    required: self.min_transactions,
                });
                continue;
            }

            self.sink.emit(&ParseEvent::StrategyAccepted {
                strategy: id,
                records: records.len(),
            });
            outcome.strategy = Some(id);
            outcome.warnings = events
                .iter()
                .filter(|e| e.is_warning())
                .map(ToString::to_string)
                .collect();
            outcome.transactions = normalize(records, format);
            break;
        }

        if outcome.strategy.is_none() {
            outcome.exhausted = true;
            self.sink.emit(&ParseEvent::ChainExhausted {
                format,
                attempts: outcome.attempts,
            });
        }

        outcome.processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Parsed {} transactions as {} in {}ms",
            outcome.len(),
            format,
            outcome.processing_time_ms
        );
        debug!("Attempts: {}, warnings: {}", outcome.attempts, outcome.warnings.len());

        outcome
    }
}
