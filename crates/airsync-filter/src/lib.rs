//! Record filters for the Airtable sync.
//!
//! This crate turns the filters built in the sync admin UI into Airtable
//! formulas (the `filterByFormula` parameter of record listings):
//!
//! 1. [`filter::FieldClassifier`] maps the table schema to the available filters.
//! 2. [`filter::FilterGroup`] holds the filter tree authored against them.
//! 3. [`filter::FormulaCompiler`] renders the tree for a given "today".
//!
//! # Example
//!
//! ```
//! use airsync_filter::filter::{classify_fields, compile_json};
//! use airtable_schema::{Field, FieldType};
//! use chrono::NaiveDate;
//!
//! let fields = vec![Field::new("fldDue", "Due", FieldType::Date)];
//! let available = classify_fields(&fields);
//!
//! let tree = r#"{"conjunction": "and", "filters": [
//!     {"columnId": "fldDue", "columnName": "Due", "operator": "isWithin", "value": {"mode": "pastWeek"}}
//! ]}"#;
//! let anchor = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
//!
//! let formula = compile_json(tree, &available, anchor).unwrap();
//! assert_eq!(formula, "AND(AND(IS_AFTER({Due},'2024-03-03'),IS_BEFORE({Due},'2024-03-11')))");
//! ```

pub mod config;
pub mod filter;

pub use config::{load_config, ClassifierConfig, CompilerConfig, ConfigError, FilterConfig};
pub use filter::{FilterError, FilterResult};
