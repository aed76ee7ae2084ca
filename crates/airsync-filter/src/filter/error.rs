//! Error types for filter compilation.

use thiserror::Error;

/// A specialized Result type for filter compilation.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that abort a formula compilation.
///
/// None of these are retryable: the filter (or the schema it was built against)
/// has to change before compiling again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// A group conjunction is neither `and` nor `or`.
    #[error("unknown conjunction: {conjunction}")]
    UnknownConjunction {
        /// The unrecognized conjunction.
        conjunction: String,
    },

    /// A criterion references a column that is not filterable anymore.
    #[error("filter not available anymore: {column}")]
    FilterNotAvailable {
        /// Name (or id, when unnamed) of the referenced column.
        column: String,
    },

    /// A date value is missing or malformed.
    #[error("invalid date value: {reason}")]
    InvalidDateValue {
        /// What is wrong with the value.
        reason: String,
    },

    /// A non-date value does not have the shape the operator needs.
    #[error("invalid value: expected {expected}, found {found}")]
    InvalidValue {
        /// The expected value shape.
        expected: String,
        /// A short description of the value found.
        found: String,
    },

    /// The operator is unknown or not applicable to the column type.
    #[error("unsupported operator '{operator}' for {field_type} filter")]
    UnsupportedOperator {
        /// The operator token.
        operator: String,
        /// The semantic type of the column, or `any` when the token is unknown.
        field_type: String,
    },

    /// Filter groups are nested deeper than the configured limit.
    #[error("filter groups nested too deep (limit: {limit})")]
    TooDeep {
        /// The configured depth limit.
        limit: usize,
    },

    /// The serialized filter tree could not be read.
    #[error("malformed filter tree: {0}")]
    MalformedTree(String),
}

impl FilterError {
    /// Creates an unknown conjunction error.
    pub fn unknown_conjunction(conjunction: impl Into<String>) -> Self {
        FilterError::UnknownConjunction {
            conjunction: conjunction.into(),
        }
    }

    /// Creates a filter not available error.
    pub fn filter_not_available(column: impl Into<String>) -> Self {
        FilterError::FilterNotAvailable {
            column: column.into(),
        }
    }

    /// Creates an invalid date value error.
    pub fn invalid_date(reason: impl Into<String>) -> Self {
        FilterError::InvalidDateValue {
            reason: reason.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(expected: impl Into<String>, found: impl Into<String>) -> Self {
        FilterError::InvalidValue {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates an unsupported operator error.
    pub fn unsupported_operator(
        operator: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        FilterError::UnsupportedOperator {
            operator: operator.into(),
            field_type: field_type.into(),
        }
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::MalformedTree(err.to_string())
    }
}
