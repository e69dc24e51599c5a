//! Raw per-strategy records, before normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field names used in raw records and in the canonical output.
pub mod fields {
    pub const DATE: &str = "Date";
    pub const DESCRIPTION: &str = "Description";
    pub const AMOUNT: &str = "Amount";
    pub const DEBIT: &str = "Debit";
    pub const CREDIT: &str = "Credit";
    pub const WITHDRAWAL: &str = "Withdrawal";
    pub const DEPOSIT: &str = "Deposit";
    pub const BALANCE: &str = "Balance";
    pub const CLOSING_BALANCE: &str = "Closing_Balance";
    pub const REF_NO: &str = "Ref_No";
    pub const CHEQUE: &str = "Cheque";
    pub const VALUE_DATE: &str = "Value_Date";
    pub const TXN_DATE: &str = "Txn_Date";
    pub const SERIAL: &str = "Sl_No";
}

/// How a layout reports money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountStyle {
    /// One signed `Amount` column.
    Single,
    /// Separate debit and credit columns.
    Split,
}

/// A record as a strategy produced it: field name to cell text.
///
/// The set of keys depends on the layout that produced the record. A key is
/// present only if the layout has that column (or the line carried that
/// token); values are untrimmed source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Amount style of the producing layout.
    pub style: AmountStyle,
    /// Page index the record started on.
    pub page: usize,
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(style: AmountStyle, page: usize) -> Self {
        Self {
            style,
            page,
            fields: BTreeMap::new(),
        }
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builder form of [`RawRecord::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Append text to a field, inserting `separator` when the field already
    /// has content. Creates the field if missing.
    pub fn append(&mut self, name: &str, text: &str, separator: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let entry = self.fields.entry(name.to_string()).or_default();
        if !entry.trim().is_empty() {
            entry.push_str(separator);
        }
        entry.push_str(text);
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_uses_separator_only_between_parts() {
        let mut record = RawRecord::new(AmountStyle::Single, 0);
        record.append(fields::DESCRIPTION, "Transfer", " ");
        record.append(fields::DESCRIPTION, "  to ABC Ltd ", " ");
        record.append(fields::DESCRIPTION, "   ", " ");
        assert_eq!(record.get(fields::DESCRIPTION), Some("Transfer to ABC Ltd"));
    }

    #[test]
    fn test_append_to_blank_field() {
        let mut record = RawRecord::new(AmountStyle::Split, 0).with(fields::DESCRIPTION, "");
        record.append(fields::DESCRIPTION, "UPI", " / ");
        assert_eq!(record.get(fields::DESCRIPTION), Some("UPI"));
    }
}
