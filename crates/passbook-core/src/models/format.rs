//! Layout family identifiers and parse mode selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PassbookError;

/// Statement layout family. Exactly one is resolved per document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormatIdentifier {
    /// Axis Bank.
    Axis,
    /// Yes Bank.
    YesBank,
    /// Jammu & Kashmir Bank.
    Jk,
    /// HDFC Bank.
    Hdfc,
    /// Kotak Mahindra Bank.
    Kotak,
    /// Anything without a known signature.
    Standard,
}

impl FormatIdentifier {
    /// Every layout family, in declaration order.
    pub const ALL: [FormatIdentifier; 6] = [
        FormatIdentifier::Axis,
        FormatIdentifier::YesBank,
        FormatIdentifier::Jk,
        FormatIdentifier::Hdfc,
        FormatIdentifier::Kotak,
        FormatIdentifier::Standard,
    ];

    /// Canonical upper-case name, as written to the `Bank` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatIdentifier::Axis => "AXIS",
            FormatIdentifier::YesBank => "YESBANK",
            FormatIdentifier::Jk => "JK",
            FormatIdentifier::Hdfc => "HDFC",
            FormatIdentifier::Kotak => "KOTAK",
            FormatIdentifier::Standard => "STANDARD",
        }
    }

    /// Lower-case name used in strategy ids and file names.
    pub fn slug(&self) -> &'static str {
        match self {
            FormatIdentifier::Axis => "axis",
            FormatIdentifier::YesBank => "yesbank",
            FormatIdentifier::Jk => "jk",
            FormatIdentifier::Hdfc => "hdfc",
            FormatIdentifier::Kotak => "kotak",
            FormatIdentifier::Standard => "standard",
        }
    }
}

impl fmt::Display for FormatIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatIdentifier {
    type Err = PassbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "axis" => Ok(FormatIdentifier::Axis),
            "yesbank" | "yes" => Ok(FormatIdentifier::YesBank),
            "jk" | "j&k" => Ok(FormatIdentifier::Jk),
            "hdfc" => Ok(FormatIdentifier::Hdfc),
            "kotak" => Ok(FormatIdentifier::Kotak),
            "standard" => Ok(FormatIdentifier::Standard),
            _ => Err(PassbookError::UnknownFormat(s.to_string())),
        }
    }
}

/// How the format for a document is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Run the classifier.
    #[default]
    Auto,
    /// Skip classification and use this format.
    Fixed(FormatIdentifier),
}

impl FromStr for Mode {
    type Err = PassbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Mode::Auto);
        }
        s.parse().map(Mode::Fixed)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Auto => f.write_str("auto"),
            Mode::Fixed(format) => f.write_str(format.slug()),
        }
    }
}

/// Whether the format came from the classifier or an override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatSource {
    Detected,
    Override,
}
