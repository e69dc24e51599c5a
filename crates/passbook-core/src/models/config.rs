//! Configuration structures for the extraction pipeline.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::format::FormatIdentifier;
use crate::error::{PassbookError, Result};

/// Main configuration for the passbook pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PassbookConfig {
    /// Format classification configuration.
    pub classifier: ClassifierConfig,

    /// Strategy and acceptance configuration.
    pub extraction: ExtractionConfig,

    /// Word-coordinate clustering configuration.
    pub coordinate: CoordinateConfig,

    /// PDF layout source configuration.
    pub pdf: PdfConfig,

    /// Merged-cell split rules, per format.
    pub split_rules: BTreeMap<FormatIdentifier, SplitRule>,
}

/// Format classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Number of leading pages scanned for signatures.
    pub prefix_pages: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { prefix_pages: 1 }
    }
}

/// Extraction and fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum records for a strategy's output to be accepted.
    pub min_transactions: usize,

    /// Separator used when joining continuation lines into a description.
    pub description_separator: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_transactions: 1,
            description_separator: " ".to_string(),
        }
    }
}

/// Virtual-table reconstruction from word positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinateConfig {
    /// Maximum vertical midpoint distance for words on one row.
    pub row_tolerance: f32,

    /// Minimum horizontal distance between word midpoints for a column gap.
    pub min_column_gap: f32,

    /// Fraction of rows that must have no word crossing a gap (0.0 - 1.0).
    pub column_support: f32,
}

impl Default for CoordinateConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 3.0,
            min_column_gap: 8.0,
            column_support: 0.5,
        }
    }
}

/// PDF layout source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Password for encrypted statements (empty password is always tried).
    pub password: Option<String>,

    /// Build tables from ruling lines drawn on the page.
    pub detect_ruled_tables: bool,

    /// Distance within which ruling lines are merged.
    pub ruling_tolerance: f32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            password: None,
            detect_ruled_tables: true,
            ruling_tolerance: 2.0,
        }
    }
}

/// Splits one table cell holding two glued values.
///
/// Both halves must fully match their pattern. `head` is the left value
/// (e.g. a serial number) and `tail` the right one (e.g. a date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRule {
    /// Column index of the merged cell.
    pub column: usize,
    /// Pattern for the left value.
    pub head: String,
    /// Pattern for the right value.
    pub tail: String,
}

impl SplitRule {
    /// Kotak statements glue the serial number onto the transaction date.
    pub fn serial_date() -> Self {
        Self {
            column: 0,
            head: r"\d{1,4}".to_string(),
            tail: r"\d{2}[-/]\d{2}[-/]\d{2,4}|\d{1,2}-[A-Za-z]{3}-\d{2,4}".to_string(),
        }
    }
}

impl Default for PassbookConfig {
    fn default() -> Self {
        let mut split_rules = BTreeMap::new();
        split_rules.insert(FormatIdentifier::Kotak, SplitRule::serial_date());
        Self {
            classifier: ClassifierConfig::default(),
            extraction: ExtractionConfig::default(),
            coordinate: CoordinateConfig::default(),
            pdf: PdfConfig::default(),
            split_rules,
        }
    }
}

impl PassbookConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges and that split patterns compile.
    pub fn validate(&self) -> Result<()> {
        if self.classifier.prefix_pages == 0 {
            return Err(PassbookError::Config(
                "classifier.prefix_pages must be at least 1".to_string(),
            ));
        }
        if self.coordinate.row_tolerance < 0.0 || self.coordinate.min_column_gap < 0.0 {
            return Err(PassbookError::Config(
                "coordinate tolerances must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.coordinate.column_support) {
            return Err(PassbookError::Config(format!(
                "coordinate.column_support must be within 0.0 - 1.0, got {}",
                self.coordinate.column_support
            )));
        }
        for (format, rule) in &self.split_rules {
            for pattern in [&rule.head, &rule.tail] {
                Regex::new(pattern).map_err(|e| {
                    PassbookError::Config(format!("split rule for {}: {}", format, e))
                })?;
            }
        }
        Ok(())
    }
}
