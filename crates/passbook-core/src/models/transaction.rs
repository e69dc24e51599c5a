//! Canonical transaction record and the per-document parse outcome.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::format::{FormatIdentifier, FormatSource};
use super::record::fields;

/// Money columns of a transaction, tagged by the layout's amount style.
///
/// A single-amount layout never carries `Debit`/`Credit` and a split layout
/// never carries `Amount`. Inner values are `None` when the source row had
/// no such value; they serialize as absent keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Amounts {
    Single {
        #[serde(rename = "Amount", skip_serializing_if = "Option::is_none")]
        amount: Option<String>,
    },
    Split {
        #[serde(rename = "Debit", skip_serializing_if = "Option::is_none")]
        debit: Option<String>,
        #[serde(rename = "Credit", skip_serializing_if = "Option::is_none")]
        credit: Option<String>,
    },
}

/// A normalized statement line.
///
/// Serializes to the persisted JSON object shape: `Date`, `Description`,
/// `Amount` or `Debit`/`Credit`, `Balance`, `Bank`, then any
/// layout-specific columns (`Ref_No`, `Cheque`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Date as printed on the statement.
    #[serde(rename = "Date")]
    pub date: String,

    /// Narration, continuation lines joined.
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub amounts: Amounts,

    /// Running balance after this line.
    #[serde(rename = "Balance", skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,

    /// Layout family the record was extracted under.
    #[serde(rename = "Bank")]
    pub bank: FormatIdentifier,

    /// Columns without a canonical slot, carried verbatim.
    #[serde(flatten)]
    pub extras: BTreeMap<String, String>,
}

impl Transaction {
    /// Look up a field by its persisted key.
    pub fn field(&self, name: &str) -> Option<&str> {
        match (name, &self.amounts) {
            (fields::DATE, _) => Some(&self.date),
            (fields::DESCRIPTION, _) => self.description.as_deref(),
            (fields::BALANCE, _) => self.balance.as_deref(),
            (fields::AMOUNT, Amounts::Single { amount }) => amount.as_deref(),
            (fields::DEBIT, Amounts::Split { debit, .. }) => debit.as_deref(),
            (fields::CREDIT, Amounts::Split { credit, .. }) => credit.as_deref(),
            (fields::AMOUNT | fields::DEBIT | fields::CREDIT, _) => None,
            ("Bank", _) => Some(self.bank.as_str()),
            _ => self.extras.get(name).map(String::as_str),
        }
    }

    /// Check if the record uses separate debit and credit columns.
    pub fn is_split(&self) -> bool {
        matches!(self.amounts, Amounts::Split { .. })
    }
}

/// Which extraction algorithm family a strategy belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyFamily {
    Table,
    Pattern,
    Coordinate,
}

impl StrategyFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyFamily::Table => "table",
            StrategyFamily::Pattern => "pattern",
            StrategyFamily::Coordinate => "coordinate",
        }
    }
}

/// Identifies one chain entry: an algorithm family run with a layout profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StrategyId {
    pub family: StrategyFamily,
    pub layout: FormatIdentifier,
}

impl StrategyId {
    pub fn new(family: StrategyFamily, layout: FormatIdentifier) -> Self {
        Self { family, layout }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family.as_str(), self.layout.slug())
    }
}

/// Everything produced for one document.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    /// Format the document was processed as.
    pub format: FormatIdentifier,
    /// Whether the format was detected or forced.
    pub format_source: FormatSource,
    /// Strategy whose output was accepted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyId>,
    /// Number of strategies run.
    pub attempts: usize,
    /// True when every strategy in the chain was rejected.
    pub exhausted: bool,
    /// Normalized transactions in statement order.
    pub transactions: Vec<Transaction>,
    /// Diagnostics from the accepted strategy (dropped rows, ambiguous splits).
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ParseOutcome {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The persisted artifact: a bare JSON array of transactions.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.transactions)
    }
}
