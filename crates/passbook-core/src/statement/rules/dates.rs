//! Date token recognition for statement rows.
//!
//! Dates are validated but never rewritten: the output keeps the text
//! exactly as the statement prints it.

use chrono::NaiveDate;

use super::patterns::{DATE_TOKEN, LINE_DATE};

const FOUR_DIGIT_YEAR: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d-%b-%Y"];
const TWO_DIGIT_YEAR: [&str; 4] = ["%d/%m/%y", "%d-%m-%y", "%d.%m.%y", "%d-%b-%y"];

/// Parse a statement date token into a calendar date.
pub fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let caps = DATE_TOKEN.captures(s)?;

    let formats = if caps[3].len() == 4 {
        &FOUR_DIGIT_YEAR
    } else {
        &TWO_DIGIT_YEAR
    };

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Check if a cell or token is a real calendar date.
pub fn is_date(s: &str) -> bool {
    parse_statement_date(s).is_some()
}

/// Return the date token a line starts with, if it is a valid date.
pub fn leading_date(line: &str) -> Option<&str> {
    let caps = LINE_DATE.captures(line)?;
    let token = caps.get(1)?.as_str();
    is_date(token).then_some(token)
}
