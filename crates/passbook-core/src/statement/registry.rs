//! Format to strategy-chain mapping.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{CoordinateConfig, FormatIdentifier, PassbookConfig, StrategyId};

use super::strategies::{
    CellSplitter, CoordinateStrategy, ExtractionStrategy, PatternStrategy, RowSettings, Strategy,
    TableStrategy,
};

/// Ordered strategies for one format.
///
/// Never empty; the last entry is always the standard pattern strategy,
/// which needs no format-specific geometry.
#[derive(Debug, Clone)]
pub struct StrategyChain {
    format: FormatIdentifier,
    entries: Vec<Strategy>,
}

impl StrategyChain {
    pub fn format(&self) -> FormatIdentifier {
        self.format
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Strategy> {
        self.entries.iter()
    }

    pub fn ids(&self) -> Vec<StrategyId> {
        self.entries.iter().map(|s| s.id()).collect()
    }
}

/// Builds strategy chains from configuration.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    separator: String,
    coordinate: CoordinateConfig,
    splitters: BTreeMap<FormatIdentifier, CellSplitter>,
}

impl StrategyRegistry {
    /// Create a registry, compiling the configured split rules.
    pub fn new(config: &PassbookConfig) -> Result<Self> {
        let splitters = config
            .split_rules
            .iter()
            .map(|(format, rule)| CellSplitter::compile(rule).map(|s| (*format, s)))
            .collect::<Result<_>>()?;

        Ok(Self {
            separator: config.extraction.description_separator.clone(),
            coordinate: config.coordinate.clone(),
            splitters,
        })
    }

    /// The fallback chain for a format.
    pub fn chain(&self, format: FormatIdentifier) -> StrategyChain {
        use FormatIdentifier::*;

        let mut entries = match format {
            Standard => vec![self.table(Standard)],
            Jk => vec![self.pattern(Jk), self.table(Standard)],
            Hdfc => vec![self.table(Hdfc), self.coordinate(Hdfc)],
            Kotak => vec![self.table(Kotak), self.coordinate(Kotak)],
            Axis => vec![self.coordinate(Axis), self.pattern(Axis)],
            YesBank => vec![self.coordinate(YesBank), self.pattern(YesBank)],
        };
        entries.push(self.pattern(Standard));

        StrategyChain { format, entries }
    }

    fn row_settings(&self, format: FormatIdentifier) -> RowSettings {
        RowSettings {
            separator: self.separator.clone(),
            splitter: self.splitters.get(&format).cloned(),
        }
    }

    fn table(&self, format: FormatIdentifier) -> Strategy {
        Strategy::Table(TableStrategy::new(format, self.row_settings(format)))
    }

    fn pattern(&self, format: FormatIdentifier) -> Strategy {
        Strategy::Pattern(PatternStrategy::new(format, self.separator.clone()))
    }

    fn coordinate(&self, format: FormatIdentifier) -> Strategy {
        Strategy::Coordinate(CoordinateStrategy::new(
            format,
            self.row_settings(format),
            self.coordinate.clone(),
        ))
    }
}
