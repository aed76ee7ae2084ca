//! Escaping of column names and values into formula literals.
//!
//! Values are only interpreted here: the same [`FilterValue`] is read as a quoted
//! string, a number, a date descriptor or a list depending on the column type and
//! operator it is used with.

use chrono::NaiveDate;
use tracing::warn;

use super::dates::{DateFilter, DateMode};
use super::error::{FilterError, FilterResult};
use super::value::{DateValue, FilterValue, Scalar};

/// The literal a scalar value is escaped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A double-quoted string literal.
    String,
    /// A bare numeric literal.
    Number,
}

/// Escapes a scalar value to a literal token, ready to be interpolated in a formula.
///
/// Dates and lists have their own readers: [`date_filter`] and [`value_list`].
///
/// # Errors
///
/// Returns `FilterError::InvalidValue` for values that cannot be read as the
/// requested shape.
pub fn literal(value: &FilterValue, shape: ValueShape) -> FilterResult<String> {
    match shape {
        ValueShape::String => string_literal(value),
        ValueShape::Number => number_literal(value),
    }
}

/// Wraps a column name in braces: `{Name}`.
///
/// The name is not escaped: formulas have no escape sequence for a closing brace,
/// so a name containing `}` yields a broken (or altered) reference. Column names
/// come from the remote schema, not from user input.
pub fn escape_column_name(name: &str) -> String {
    if name.contains('}') {
        warn!(column = name, "column name contains a closing brace");
    }
    format!("{{{name}}}")
}

/// Quotes a string, escaping backslashes and double quotes.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Escapes a scalar as a quoted string literal. A missing value is `""`.
pub fn string_literal(value: &FilterValue) -> FilterResult<String> {
    match value {
        FilterValue::Null => Ok(quote("")),
        FilterValue::Text(s) => Ok(quote(s)),
        FilterValue::Number(n) => Ok(quote(&n.to_string())),
        other => Err(FilterError::invalid_value("string", other.kind())),
    }
}

/// Escapes a JSON number or numeric string as a bare number literal.
pub fn number_literal(value: &FilterValue) -> FilterResult<String> {
    match value {
        FilterValue::Number(n) => Ok(n.to_string()),
        FilterValue::Text(s) if is_number(s.trim()) => Ok(s.trim().to_string()),
        FilterValue::Text(s) => Err(FilterError::invalid_value("number", format!("\"{s}\""))),
        other => Err(FilterError::invalid_value("number", other.kind())),
    }
}

fn is_number(s: &str) -> bool {
    s.parse::<f64>().is_ok_and(f64::is_finite)
        && s.chars().all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
}

/// Coerces a value to a list: scalars become one-element lists, lists pass
/// through, anything else is an empty list.
pub fn value_list(value: &FilterValue) -> Vec<FilterValue> {
    match value {
        FilterValue::List(items) => items.clone(),
        FilterValue::Text(_) | FilterValue::Number(_) | FilterValue::Bool(_) => vec![value.clone()],
        FilterValue::Null | FilterValue::Date(_) => Vec::new(),
    }
}

/// Validates a date descriptor.
///
/// # Errors
///
/// Returns `FilterError::InvalidDateValue` if the value is not a non-empty date
/// object, if `numberOfDays` is not a non-negative integer, if `input` is not a
/// `YYYY-MM-DD` date, or if `mode` is missing or unknown.
pub fn date_filter(value: &FilterValue) -> FilterResult<DateFilter> {
    let date = match value {
        FilterValue::Date(date) if !date.is_empty() => date,
        _ => return Err(FilterError::invalid_date("expected a non-empty date object")),
    };

    Ok(DateFilter {
        number_of_days: number_of_days(date)?,
        input: input(date)?,
        mode: mode(date)?,
    })
}

fn number_of_days(date: &DateValue) -> FilterResult<Option<u32>> {
    let invalid =
        || FilterError::invalid_date("unexpected numberOfDays value, format expected: number");

    match &date.number_of_days {
        None => Ok(None),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Text(s)) => s.trim().parse::<u32>().map(Some).map_err(|_| invalid()),
        Some(Scalar::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(invalid),
        Some(Scalar::Other(_)) => Err(invalid()),
    }
}

fn input(date: &DateValue) -> FilterResult<Option<NaiveDate>> {
    match &date.input {
        None => Ok(None),
        Some(Scalar::Text(s)) if s.is_empty() => Ok(None),
        Some(Scalar::Text(s)) => parse_input(s).map(Some),
        Some(Scalar::Number(_) | Scalar::Other(_)) => Err(invalid_input()),
    }
}

fn mode(date: &DateValue) -> FilterResult<DateMode> {
    match &date.mode {
        None => Err(FilterError::invalid_date("date mode is required")),
        Some(Scalar::Text(s)) if s.is_empty() => {
            Err(FilterError::invalid_date("date mode is required"))
        }
        Some(Scalar::Text(s)) => s.parse(),
        Some(Scalar::Number(_) | Scalar::Other(_)) => Err(FilterError::invalid_date(
            "unexpected date mode value, format expected: string",
        )),
    }
}

fn invalid_input() -> FilterError {
    FilterError::invalid_date("unexpected date input value, format expected: YYYY-MM-DD")
}

fn parse_input(input: &str) -> FilterResult<NaiveDate> {
    let bytes = input.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(invalid_input());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| invalid_input())
}
