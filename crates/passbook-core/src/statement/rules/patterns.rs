//! Common regex patterns for statement extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Date tokens: 01/04/2024, 01-04-24, 01.04.2024, 1-Apr-24, 01-APR-2024
    pub static ref DATE_TOKEN: Regex = Regex::new(
        r"^(\d{1,2})[./\-](\d{1,2}|[A-Za-z]{3})[./\-](\d{2}|\d{4})$"
    ).unwrap();

    // Date at the very start of a text line (anchor for line parsing)
    pub static ref LINE_DATE: Regex = Regex::new(
        r"^\s*(\d{1,2}[./\-](?:\d{1,2}|[A-Za-z]{3})[./\-](?:\d{4}|\d{2}))(?:\s|$)"
    ).unwrap();

    // Strict amount token for free text: decimal part required,
    // thousands separators in western (1,234,567.00) or Indian (12,34,567.00) grouping
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        r"^[-+]?(?:\d{1,3}(?:,\d{2,3})+|\d+)\.\d{1,2}(?:\s?\(?(?:Cr|Dr|CR|DR)\)?)?$"
    ).unwrap();

    // Lenient amount for table cells: decimal part optional
    pub static ref AMOUNT_CELL: Regex = Regex::new(
        r"^[-+]?(?:\d{1,3}(?:,\d{2,3})+|\d+)(?:\.\d+)?\s*(?:\(?(?:Cr|Dr|CR|DR)\)?)?$"
    ).unwrap();

    // Cr/Dr marker glued to or following an amount
    pub static ref CR_DR_SUFFIX: Regex = Regex::new(
        r"\s*\(?(?:Cr|Dr|CR|DR)\)?$"
    ).unwrap();

    // Six-digit cheque number (J&K line layout)
    pub static ref CHEQUE_NO: Regex = Regex::new(
        r"^\d{6}$"
    ).unwrap();

    // Runs of whitespace inside a joined description
    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();
}
