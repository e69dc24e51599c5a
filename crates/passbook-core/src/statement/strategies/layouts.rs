//! Per-format layout profiles.
//!
//! A profile describes where a layout keeps its fields. Table and
//! coordinate strategies use a [`ColumnMap`]; the pattern strategy uses a
//! [`PatternLayout`].

use crate::models::{AmountStyle, FormatIdentifier, fields};

/// Keywords that mark a header row as naming the date column.
const HEADER_DATE_KEYWORDS: [&str; 3] = ["date", "transaction", "txn"];

/// Keywords that mark a header row as naming a money column.
const HEADER_AMOUNT_KEYWORDS: [&str; 6] =
    ["amount", "balance", "withdrawal", "deposit", "debit", "credit"];

/// Fields holding money values.
const MONEY_FIELDS: [&str; 7] = [
    fields::AMOUNT,
    fields::DEBIT,
    fields::CREDIT,
    fields::WITHDRAWAL,
    fields::DEPOSIT,
    fields::BALANCE,
    fields::CLOSING_BALANCE,
];

/// Check if a field name holds a money value.
pub fn is_money_field(name: &str) -> bool {
    MONEY_FIELDS.contains(&name)
}

/// Check if a row reads like a table header.
pub fn is_header_row(cells: &[String]) -> bool {
    let text = cells.join(" ").to_lowercase();
    HEADER_DATE_KEYWORDS.iter().any(|k| text.contains(k))
        && HEADER_AMOUNT_KEYWORDS.iter().any(|k| text.contains(k))
}

/// Positional column mapping.
///
/// `leading` fields bind to cells from the left, `trailing` fields to cells
/// from the right. Cells left over in between join into `Description`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMap {
    pub leading: Vec<String>,
    pub trailing: Vec<String>,
    pub style: AmountStyle,
}

impl ColumnMap {
    pub fn new(leading: &[&str], trailing: &[&str], style: AmountStyle) -> Self {
        Self {
            leading: leading.iter().map(|s| s.to_string()).collect(),
            trailing: trailing.iter().map(|s| s.to_string()).collect(),
            style,
        }
    }

    /// Build a map from header cells, one field per column.
    ///
    /// Known headers map onto canonical field names; other headers keep
    /// their text with spaces replaced by underscores, and blank headers
    /// become `col_<index>`.
    pub fn from_header(cells: &[String]) -> Self {
        let leading: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| header_field(cell).unwrap_or_else(|| fallback_field(i, cell)))
            .collect();

        let split = leading.iter().any(|f| {
            matches!(
                f.as_str(),
                fields::DEBIT | fields::CREDIT | fields::WITHDRAWAL | fields::DEPOSIT
            )
        });

        Self {
            leading,
            trailing: Vec::new(),
            style: if split {
                AmountStyle::Split
            } else {
                AmountStyle::Single
            },
        }
    }

    /// Whether the map has a `Date` column.
    pub fn has_date(&self) -> bool {
        self.leading.iter().chain(&self.trailing).any(|f| f == fields::DATE)
    }

    /// Money fields bound by this map.
    pub fn money_fields(&self) -> impl Iterator<Item = &str> {
        self.leading
            .iter()
            .chain(&self.trailing)
            .map(String::as_str)
            .filter(|f| is_money_field(f))
    }

    /// Bind row cells to field names.
    ///
    /// Short rows keep the trailing fields first (money columns sit at the
    /// right edge) while always leaving the first cell to the leading map.
    pub fn bind(&self, cells: &[String]) -> Vec<(String, String)> {
        let n = cells.len();
        let trailing = self.trailing.len().min(n.saturating_sub(1));
        let leading = self.leading.len().min(n - trailing);

        let mut bound = Vec::with_capacity(n);
        for (field, cell) in self.leading.iter().zip(&cells[..leading]) {
            bound.push((field.clone(), cell.trim().to_string()));
        }

        let middle: Vec<&str> = cells[leading..n - trailing]
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if leading < n - trailing {
            let text = middle.join(" ");
            match bound.iter_mut().find(|(f, _)| f == fields::DESCRIPTION) {
                Some((_, value)) if !text.is_empty() => {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(&text);
                }
                Some(_) => {}
                None => bound.push((fields::DESCRIPTION.to_string(), text)),
            }
        }

        let offset = self.trailing.len() - trailing;
        for (field, cell) in self.trailing[offset..].iter().zip(&cells[n - trailing..]) {
            bound.push((field.clone(), cell.trim().to_string()));
        }
        bound
    }
}

fn header_field(cell: &str) -> Option<String> {
    let key: String = cell
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let field = match key.as_str() {
        "date" | "txn date" | "tran date" | "transaction date" | "post date" | "posting date" => {
            fields::DATE
        }
        "value date" | "value dt" => fields::VALUE_DATE,
        "description" | "narration" | "particulars" | "details" | "remarks"
        | "transaction details" | "transaction remarks" => fields::DESCRIPTION,
        "amount" | "amount inr" | "amount rs" | "transaction amount" => fields::AMOUNT,
        "debit" | "debits" | "dr" | "debit amount" => fields::DEBIT,
        "credit" | "credits" | "cr" | "credit amount" => fields::CREDIT,
        "withdrawal" | "withdrawals" | "withdrawal amt" | "withdrawal amount" => {
            fields::WITHDRAWAL
        }
        "deposit" | "deposits" | "deposit amt" | "deposit amount" => fields::DEPOSIT,
        "balance" | "balance inr" | "running balance" | "available balance" => fields::BALANCE,
        "closing balance" => fields::CLOSING_BALANCE,
        "chq no" | "cheque no" | "chq ref no" | "cheque number" | "instrument no" => {
            fields::CHEQUE
        }
        "ref no" | "reference no" | "ref number" | "reference" | "chqref no" => fields::REF_NO,
        "sl no" | "s no" | "sr no" | "serial no" | "no" => fields::SERIAL,
        _ => return None,
    };
    Some(field.to_string())
}

fn fallback_field(index: usize, cell: &str) -> String {
    let cell = cell.trim();
    if cell.is_empty() {
        format!("col_{}", index)
    } else {
        cell.split_whitespace().collect::<Vec<_>>().join("_")
    }
}

/// Table layout of a format: either a fixed column map or one read from
/// each table's header row.
#[derive(Debug, Clone, PartialEq)]
pub enum TableLayout {
    Fixed(ColumnMap),
    FromHeader,
}

impl TableLayout {
    /// Layout used by table and coordinate strategies for a format.
    pub fn for_format(format: FormatIdentifier) -> Self {
        use fields::*;
        match format {
            FormatIdentifier::Axis => TableLayout::Fixed(ColumnMap::new(
                &[DATE],
                &[AMOUNT, BALANCE],
                AmountStyle::Single,
            )),
            FormatIdentifier::YesBank => TableLayout::Fixed(ColumnMap::new(
                &[DATE],
                &[DEBIT, CREDIT, BALANCE],
                AmountStyle::Split,
            )),
            FormatIdentifier::Hdfc => TableLayout::Fixed(ColumnMap::new(
                &[DATE, DESCRIPTION, REF_NO, VALUE_DATE],
                &[WITHDRAWAL, DEPOSIT, CLOSING_BALANCE],
                AmountStyle::Split,
            )),
            FormatIdentifier::Kotak => TableLayout::Fixed(ColumnMap::new(
                &[SERIAL, DATE, DESCRIPTION, REF_NO],
                &[WITHDRAWAL, DEPOSIT, BALANCE],
                AmountStyle::Split,
            )),
            FormatIdentifier::Jk | FormatIdentifier::Standard => TableLayout::FromHeader,
        }
    }
}

/// Line layout of a format for the pattern strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternLayout {
    pub style: AmountStyle,
    /// Money fields in left-to-right order; tokens bind right-to-left.
    pub amounts: &'static [&'static str],
    /// Field for a second date directly after the first.
    pub secondary_date: Option<&'static str>,
    /// Whether a six-digit cheque number (or a bare "-") may follow the dates.
    pub cheque: bool,
    /// Field for a non-amount token ending the line.
    pub trailing_ref: Option<&'static str>,
    /// Lines containing any of these are skipped.
    pub boilerplate: &'static [&'static str],
    /// Non-anchor lines starting with one of these prefix the next anchor.
    pub lead_ins: &'static [&'static str],
}

const COMMON_BOILERPLATE: &[&str] = &[
    "Opening Balance",
    "OPENING BALANCE",
    "Closing Balance",
    "CLOSING BALANCE",
    "Balance Carried",
    "Balance Brought",
    "Page ",
];

const JK_BOILERPLATE: &[&str] = &["Value Date", "Account Balance", "Page", "Balance Carried"];

const JK_LEAD_INS: &[&str] = &[
    "mTFR",
    "NEFT",
    "RTGS",
    "UPI",
    "By Cash",
    "To Transfer",
    "IMPS",
    "ACH",
    "BPAY",
    "MB:",
    "Dr Card",
    "eTFR",
    "REJECT",
    "By Inst",
    "Cheque",
    "To Clg",
    "Int. Pd",
    "Pos",
    "CMS",
    "TRF",
];

impl PatternLayout {
    /// Line layout for a format.
    ///
    /// Formats without a dedicated line layout use the standard one.
    pub fn for_format(format: FormatIdentifier) -> Self {
        use fields::*;
        match format {
            FormatIdentifier::Jk => PatternLayout {
                style: AmountStyle::Split,
                amounts: &[WITHDRAWAL, DEPOSIT, BALANCE],
                secondary_date: Some(TXN_DATE),
                cheque: true,
                trailing_ref: Some(REF_NO),
                boilerplate: JK_BOILERPLATE,
                lead_ins: JK_LEAD_INS,
            },
            FormatIdentifier::YesBank => PatternLayout {
                style: AmountStyle::Split,
                amounts: &[DEBIT, CREDIT, BALANCE],
                secondary_date: Some(VALUE_DATE),
                cheque: false,
                trailing_ref: None,
                boilerplate: COMMON_BOILERPLATE,
                lead_ins: &[],
            },
            FormatIdentifier::Axis
            | FormatIdentifier::Hdfc
            | FormatIdentifier::Kotak
            | FormatIdentifier::Standard => PatternLayout {
                style: AmountStyle::Single,
                amounts: &[AMOUNT, BALANCE],
                secondary_date: None,
                cheque: false,
                trailing_ref: None,
                boilerplate: COMMON_BOILERPLATE,
                lead_ins: &[],
            },
        }
    }

    pub fn is_boilerplate(&self, line: &str) -> bool {
        self.boilerplate.iter().any(|m| line.contains(m))
    }

    pub fn is_lead_in(&self, line: &str) -> bool {
        let upper = line.to_uppercase();
        self.lead_ins
            .iter()
            .any(|k| upper.starts_with(&k.to_uppercase()))
    }
}
