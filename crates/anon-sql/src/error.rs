//! Error types for the SQL crate.

use thiserror::Error;

/// Errors raised while analyzing SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// SQL parsing failed.
    #[error("failed to parse SQL: {0}")]
    ParseError(String),

    /// The function call text is empty.
    #[error("function call is empty")]
    EmptyFunctionCall,

    /// The text is not a single function call.
    #[error("'{call}' is not a valid function call")]
    InvalidFunctionCall { call: String },
}

impl SqlError {
    /// SQLSTATE reported to the client.
    pub fn sqlstate(&self) -> &'static str {
        match self {
            // syntax_error
            SqlError::ParseError(_) => "42601",
            // invalid_name
            SqlError::EmptyFunctionCall | SqlError::InvalidFunctionCall { .. } => "42602",
        }
    }
}
