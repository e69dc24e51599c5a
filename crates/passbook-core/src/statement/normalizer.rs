//! Maps raw per-layout field sets onto the canonical transaction shape.

use std::collections::BTreeMap;

use tracing::trace;

use crate::models::{AmountStyle, Amounts, FormatIdentifier, RawRecord, Transaction, fields};

use super::rules::WHITESPACE_RUN;

/// Canonical name for a raw field name.
fn canonical(name: &str) -> &str {
    match name {
        fields::WITHDRAWAL => fields::DEBIT,
        fields::DEPOSIT => fields::CREDIT,
        fields::CLOSING_BALANCE | "Closing Balance" => fields::BALANCE,
        "Narration" | "Particulars" => fields::DESCRIPTION,
        other => other,
    }
}

/// Persisted keys stamped by the normalizer itself; source columns with these
/// names are carried under a `_col` suffix.
const STAMPED: &[&str] = &["Bank"];

/// Normalize raw records into transactions stamped with `format`.
pub fn normalize(records: Vec<RawRecord>, format: FormatIdentifier) -> Vec<Transaction> {
    records.iter().map(|r| normalize_record(r, format)).collect()
}

/// Normalize a single raw record.
///
/// Values are trimmed and description whitespace collapsed. Fields missing
/// from the raw record stay missing; nothing is defaulted.
pub fn normalize_record(record: &RawRecord, format: FormatIdentifier) -> Transaction {
    let mut known: BTreeMap<&str, String> = BTreeMap::new();
    let mut extras = BTreeMap::new();

    for (name, value) in record.iter() {
        let value = value.trim().to_string();
        match canonical(name) {
            key @ (fields::DATE
            | fields::DESCRIPTION
            | fields::AMOUNT
            | fields::DEBIT
            | fields::CREDIT
            | fields::BALANCE) => {
                known.insert(key, value);
            }
            other if STAMPED.contains(&other) => {
                let renamed = format!("{}_col", other);
                trace!("Carrying source column {} as {}", other, renamed);
                extras.insert(renamed, value);
            }
            other => {
                extras.insert(other.to_string(), value);
            }
        }
    }

    let amounts = match record.style {
        AmountStyle::Single => Amounts::Single {
            amount: known.remove(fields::AMOUNT),
        },
        AmountStyle::Split => Amounts::Split {
            debit: known.remove(fields::DEBIT),
            credit: known.remove(fields::CREDIT),
        },
    };

    // a transaction carries Amount or Debit/Credit, never both
    for key in [fields::AMOUNT, fields::DEBIT, fields::CREDIT] {
        if let Some(value) = known.remove(key) {
            trace!("Discarding {} '{}' outside the {:?} amount style", key, value, record.style);
        }
    }

    let description = known
        .remove(fields::DESCRIPTION)
        .map(|d| WHITESPACE_RUN.replace_all(&d, " ").into_owned());

    Transaction {
        date: known.remove(fields::DATE).unwrap_or_default(),
        description,
        amounts,
        balance: known.remove(fields::BALANCE),
        bank: format,
        extras,
    }
}
