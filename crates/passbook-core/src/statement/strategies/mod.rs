//! Extraction strategies.
//!
//! Three algorithm families share one contract: given a document, produce
//! raw records. Each chain entry pairs a family with a format's layout.

mod coordinate;
pub mod layouts;
mod pattern;
pub mod rows;
mod table;

pub use coordinate::{CoordinateStrategy, cluster_columns, group_rows};
pub use layouts::{ColumnMap, PatternLayout, TableLayout};
pub use pattern::PatternStrategy;
pub use rows::{CellSplitter, RowSettings};
pub use table::TableStrategy;

use crate::models::{Document, RawRecord, StrategyId};

use super::events::ParseEvent;

/// Per-attempt scratch state: the diagnostics one strategy run produces.
#[derive(Debug)]
pub struct ExtractContext {
    strategy: StrategyId,
    events: Vec<ParseEvent>,
}

impl ExtractContext {
    pub fn new(strategy: StrategyId) -> Self {
        Self {
            strategy,
            events: Vec::new(),
        }
    }

    pub fn strategy(&self) -> StrategyId {
        self.strategy
    }

    pub fn push(&mut self, event: ParseEvent) {
        self.events.push(event);
    }

    /// Record how many records a page produced.
    pub fn page_records(&mut self, page: usize, records: usize) {
        let strategy = self.strategy;
        self.push(ParseEvent::PageRecords {
            strategy,
            page,
            records,
        });
    }

    pub fn events(&self) -> &[ParseEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<ParseEvent> {
        self.events
    }
}

/// Trait for extraction strategies.
pub trait ExtractionStrategy {
    /// Chain entry identifier, e.g. `table:hdfc`.
    fn id(&self) -> StrategyId;

    /// Extract raw records in statement order. An empty result means the
    /// strategy found nothing it recognizes.
    fn extract(&self, document: &Document, ctx: &mut ExtractContext) -> Vec<RawRecord>;
}

/// A chain entry of one of the three families.
#[derive(Debug, Clone)]
pub enum Strategy {
    Table(TableStrategy),
    Pattern(PatternStrategy),
    Coordinate(CoordinateStrategy),
}

impl ExtractionStrategy for Strategy {
    fn id(&self) -> StrategyId {
        match self {
            Strategy::Table(s) => s.id(),
            Strategy::Pattern(s) => s.id(),
            Strategy::Coordinate(s) => s.id(),
        }
    }

    fn extract(&self, document: &Document, ctx: &mut ExtractContext) -> Vec<RawRecord> {
        match self {
            Strategy::Table(s) => s.extract(document, ctx),
            Strategy::Pattern(s) => s.extract(document, ctx),
            Strategy::Coordinate(s) => s.extract(document, ctx),
        }
    }
}
