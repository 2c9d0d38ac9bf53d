//! Query compilation error types

use thiserror::Error;

/// Errors raised while validating or compiling a column list.
///
/// Every variant carries the zero-based position of the offending column so
/// clients can point at the exact term they sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Column {index}: name must not be empty")]
    EmptyName { index: usize },

    #[error("Column {index} ('{column}'): value must not be null")]
    NilValue { index: usize, column: String },

    #[error("Column {index}: unknown operator '{operator}'")]
    UnknownOperator { index: usize, operator: String },

    #[error("Column {index}: unknown logic '{connective}'")]
    UnknownConnective { index: usize, connective: String },

    #[error("Column {index} ('{column}'): 'in' requires a comma-separated string or an array")]
    InvalidMembershipValue { index: usize, column: String },
}

impl QueryError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyName { .. } => "EMPTY_NAME",
            Self::NilValue { .. } => "NIL_VALUE",
            Self::UnknownOperator { .. } => "UNKNOWN_OPERATOR",
            Self::UnknownConnective { .. } => "UNKNOWN_CONNECTIVE",
            Self::InvalidMembershipValue { .. } => "INVALID_MEMBERSHIP_VALUE",
        }
    }

    /// Position of the column that failed
    pub fn index(&self) -> usize {
        match self {
            Self::EmptyName { index }
            | Self::NilValue { index, .. }
            | Self::UnknownOperator { index, .. }
            | Self::UnknownConnective { index, .. }
            | Self::InvalidMembershipValue { index, .. } => *index,
        }
    }
}
