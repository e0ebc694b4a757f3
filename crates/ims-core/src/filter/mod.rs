mod ast;
mod parser;

use thiserror::Error;

pub use ast::FilterTerm;
pub use parser::{format_filter, parse_filter, parse_terms};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterParseError {
    #[error("unknown filter key: {0}")]
    UnknownKey(String),
    #[error("empty value for filter key: {0}")]
    EmptyValue(String),
    #[error("filter key given more than once: {0}")]
    DuplicateKey(String),
    #[error("invalid interaction type: {0}")]
    InvalidType(String),
    #[error("invalid date for {key}: {value} (expected YYYY-MM-DD)")]
    InvalidDate { key: String, value: String },
    #[error("unterminated quote")]
    UnterminatedQuote,
}
