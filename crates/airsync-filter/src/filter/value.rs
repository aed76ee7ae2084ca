//! Filter values as authored in the admin UI.
//!
//! A criterion's value can be a scalar, a list of scalars or a date descriptor
//! depending on its operator and column type. [`FilterValue`] keeps that shape
//! as-is; it is only interpreted at the escaping boundary (see [`super::escape`]).

use serde::{Deserialize, Serialize};

/// The raw value of a criterion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Missing value.
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<FilterValue>),
    /// A relative or absolute date descriptor.
    Date(DateValue),
}

impl FilterValue {
    /// Short name of the value shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FilterValue::Null => "null",
            FilterValue::Bool(_) => "boolean",
            FilterValue::Number(_) => "number",
            FilterValue::Text(_) => "string",
            FilterValue::List(_) => "list",
            FilterValue::Date(_) => "date object",
        }
    }

    /// Returns true for `null`, `""`, `[]` and an all-empty date object.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Null => true,
            FilterValue::Text(s) => s.is_empty(),
            FilterValue::List(items) => items.is_empty(),
            FilterValue::Date(date) => date.is_empty(),
            FilterValue::Bool(_) | FilterValue::Number(_) => false,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<DateValue> for FilterValue {
    fn from(value: DateValue) -> Self {
        FilterValue::Date(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Date descriptor as sent by the UI: `{mode, numberOfDays?, input?}`.
///
/// Fields are unvalidated and accept any JSON type, so a malformed descriptor
/// still reads as a date and is rejected by [`super::escape::date_filter`].
/// Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_days: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Scalar>,
}

impl DateValue {
    /// Creates a descriptor with only a mode.
    pub fn mode(mode: impl Into<String>) -> Self {
        Self {
            mode: Some(Scalar::Text(mode.into())),
            ..Self::default()
        }
    }

    /// Creates an `exactDate` descriptor.
    pub fn exact(input: impl Into<String>) -> Self {
        Self::mode("exactDate").with_input(input)
    }

    /// Sets `numberOfDays`.
    pub fn with_days(mut self, days: i64) -> Self {
        self.number_of_days = Some(Scalar::Number(days.into()));
        self
    }

    /// Sets `input`.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(Scalar::Text(input.into()));
        self
    }

    /// Returns true when no field carries a value.
    pub fn is_empty(&self) -> bool {
        [&self.mode, &self.number_of_days, &self.input]
            .into_iter()
            .all(|field| field.as_ref().map_or(true, Scalar::is_empty))
    }
}

/// A descriptor field: usually a string or a number, kept as-is otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl Scalar {
    fn is_empty(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.is_empty())
    }
}
