//! Structured parse events and the sinks that receive them.

use std::fmt;

use tracing::{debug, info, warn};

use crate::models::{FormatIdentifier, FormatSource, StrategyId};

/// A diagnostic emitted while parsing one document.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    /// The document's format was resolved.
    Classified {
        format: FormatIdentifier,
        source: FormatSource,
    },
    /// A chain entry is about to run.
    StrategyAttempted { strategy: StrategyId, attempt: usize },
    /// A chain entry produced an acceptable record set.
    StrategyAccepted { strategy: StrategyId, records: usize },
    /// A chain entry produced too few records; its output is discarded.
    StrategyRejected {
        strategy: StrategyId,
        records: usize,
        required: usize,
    },
    /// Records produced from one page.
    PageRecords {
        strategy: StrategyId,
        page: usize,
        records: usize,
    },
    /// A row was dropped because an amount cell was not numeric.
    RowDropped {
        page: usize,
        column: String,
        value: String,
    },
    /// A merged cell had several valid splits; the longest tail was used.
    AmbiguousSplit {
        page: usize,
        cell: String,
        candidates: usize,
    },
    /// Every chain entry was rejected.
    ChainExhausted {
        format: FormatIdentifier,
        attempts: usize,
    },
}

impl ParseEvent {
    /// Whether the event belongs in the outcome's warning list.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ParseEvent::RowDropped { .. } | ParseEvent::AmbiguousSplit { .. }
        )
    }
}

impl fmt::Display for ParseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseEvent::Classified { format, source } => {
                write!(f, "format {} ({:?})", format, source)
            }
            ParseEvent::StrategyAttempted { strategy, attempt } => {
                write!(f, "attempt {}: {}", attempt, strategy)
            }
            ParseEvent::StrategyAccepted { strategy, records } => {
                write!(f, "{} accepted with {} records", strategy, records)
            }
            ParseEvent::StrategyRejected {
                strategy,
                records,
                required,
            } => write!(
                f,
                "{} rejected: {} records, {} required",
                strategy, records, required
            ),
            ParseEvent::PageRecords {
                strategy,
                page,
                records,
            } => write!(f, "{} page {}: {} records", strategy, page + 1, records),
            ParseEvent::RowDropped {
                page,
                column,
                value,
            } => write!(
                f,
                "page {}: dropped row with non-numeric {} '{}'",
                page + 1,
                column,
                value
            ),
            ParseEvent::AmbiguousSplit {
                page,
                cell,
                candidates,
            } => write!(
                f,
                "page {}: ambiguous split of '{}' ({} candidates), used longest tail",
                page + 1,
                cell,
                candidates
            ),
            ParseEvent::ChainExhausted { format, attempts } => {
                write!(f, "{} chain exhausted after {} attempts", format, attempts)
            }
        }
    }
}

/// Receiver for parse events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ParseEvent);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ParseEvent) {
        match event {
            ParseEvent::Classified { format, source } => {
                info!(format = %format, source = ?source, "format classified");
            }
            ParseEvent::StrategyAttempted { strategy, attempt } => {
                debug!(strategy = %strategy, attempt, "strategy attempted");
            }
            ParseEvent::StrategyAccepted { strategy, records } => {
                info!(strategy = %strategy, records, "strategy accepted");
            }
            ParseEvent::StrategyRejected {
                strategy,
                records,
                required,
            } => {
                debug!(strategy = %strategy, records, required, "strategy rejected");
            }
            ParseEvent::PageRecords {
                strategy,
                page,
                records,
            } => {
                debug!(strategy = %strategy, page, records, "page records");
            }
            ParseEvent::RowDropped {
                page,
                column,
                value,
            } => {
                warn!(page, column = %column, value = %value, "row dropped");
            }
            ParseEvent::AmbiguousSplit {
                page,
                cell,
                candidates,
            } => {
                warn!(page, cell = %cell, candidates, "ambiguous split");
            }
            ParseEvent::ChainExhausted { format, attempts } => {
                warn!(format = %format, attempts, "strategy chain exhausted");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &ParseEvent) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Keeps every event for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<ParseEvent>>,
    }

    impl RecordingSink {
        pub fn events(&self) -> Vec<ParseEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: &ParseEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StrategyFamily;

    #[test]
    fn test_warning_events() {
        let dropped = ParseEvent::RowDropped {
            page: 0,
            column: "Balance".to_string(),
            value: "N/A".to_string(),
        };
        assert!(dropped.is_warning());
        assert_eq!(
            dropped.to_string(),
            "page 1: dropped row with non-numeric Balance 'N/A'"
        );

        let attempted = ParseEvent::StrategyAttempted {
            strategy: StrategyId::new(StrategyFamily::Table, FormatIdentifier::Hdfc),
            attempt: 1,
        };
        assert!(!attempted.is_warning());
        assert_eq!(attempted.to_string(), "attempt 1: table:hdfc");
    }
}
