//! Token rules shared by the extraction strategies.

pub mod amounts;
pub mod dates;
pub mod patterns;

pub use amounts::{is_amount, is_amount_token, parse_amount};
pub use dates::{is_date, leading_date, parse_statement_date};
pub use patterns::*;
