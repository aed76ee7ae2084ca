//! Filter tree compilation into Airtable formulas.
//!
//! # Pipeline
//!
//! - [`classify`](FieldClassifier::classify): schema fields to [`FilterDescriptor`]s
//! - [`FilterGroup::from_json`]: admin UI payload to a typed tree
//! - [`FormulaCompiler::compile`]: multi-value operators are expanded into
//!   groups of primitive criteria, then every node is rendered
//!
//! # Formula syntax
//!
//! - `AND(a, b)`, `OR(a, b)`, `NOT(a)` - Boolean combinators
//! - `{Column}` - Column reference
//! - `"text"` - String literal (`\"` and `\\` escaped)
//! - `FIND(needle,{Column})` - Substring test
//! - `IS_SAME(...)`, `IS_BEFORE(...)`, `IS_AFTER(...)` - Date comparisons
//! - `BLANK()`, `TRUE()`, `FALSE()` - Constants

mod ast;
mod classify;
mod compiler;
mod dates;
mod desugar;
mod error;
mod escape;
mod value;

pub use ast::{Conjunction, Criterion, FilterGroup, FilterNode, Operator};
pub use classify::{
    classify_fields, strip_suffix_label, FieldClassifier, FilterDescriptor, FilterExtension,
    FilterOption, FilterType,
};
pub use compiler::{compile, compile_json, FormulaCompiler};
pub use dates::{DateFilter, DateMode, DateRange, DateResolver};
pub use error::{FilterError, FilterResult};
pub use escape::{
    date_filter, escape_column_name, literal, number_literal, quote, string_literal, value_list,
    ValueShape,
};
pub use value::{DateValue, FilterValue, Scalar};

#[cfg(test)]
mod tests;
