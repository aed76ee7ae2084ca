//! Airtable table schema models.
//!
//! These types mirror the payload of Airtable's base schema endpoint
//! (`GET /v0/meta/bases/{baseId}/tables`), as consumed by the record sync.
//!
//! # Example
//!
//! ```
//! use airtable_schema::{normalize_fields, FieldType, SchemaResponse};
//!
//! let json = r#"{"tables":[{"id":"tbl1","name":"Books","fields":[
//!     {"id":"fld1","name":"Title","type":"singleLineText"}
//! ]}]}"#;
//! let schema: SchemaResponse = serde_json::from_str(json).unwrap();
//! let fields = normalize_fields(schema.tables[0].fields.clone());
//! assert_eq!(fields[0].field_type, FieldType::SingleLineText);
//! ```

pub mod field;
pub mod formula;
pub mod table;

pub use field::{Choice, Field, FieldOptions, FieldType, FormulaResult, RELATIONSHIP_PREFIX};
pub use formula::normalize_fields;
pub use table::{SchemaResponse, Table};
