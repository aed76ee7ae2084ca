//! Field descriptors as returned by the schema endpoint.

use serde::{Deserialize, Serialize};

/// Id prefix of the synthetic fields generated for linked-record relationships.
///
/// These fields are expanded by the sync layer and have no filter semantics of their own.
pub const RELATIONSHIP_PREFIX: &str = "__rel__";

/// A single column of an Airtable table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field id (e.g. `fldXXXXXXXXXXXXXX`).
    pub id: String,

    /// Display name, also used to reference the column in formulas.
    pub name: String,

    /// Raw field type.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Optional field description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Type-specific options (choices, formula result, precision...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<FieldOptions>,
}

impl Field {
    /// Creates a field without description or options.
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type,
            description: None,
            options: None,
        }
    }

    /// Attaches select choices to the field, replacing existing options.
    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(FieldOptions {
            choices: choices.into_iter().map(Choice::named).collect(),
            ..FieldOptions::default()
        });
        self
    }

    /// Returns true for the synthetic relationship fields (see [`RELATIONSHIP_PREFIX`]).
    pub fn is_relationship(&self) -> bool {
        self.id.starts_with(RELATIONSHIP_PREFIX)
    }

    /// Returns the select choices, or an empty slice for non-select fields.
    pub fn choices(&self) -> &[Choice] {
        self.options
            .as_ref()
            .map(|options| options.choices.as_slice())
            .unwrap_or_default()
    }
}

/// Type-specific field options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOptions {
    /// Choices of `singleSelect` / `multipleSelects` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,

    /// Result descriptor of computed (`formula`) fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Box<FormulaResult>>,

    /// Any other option keys, kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A select choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Choice {
    /// Creates a choice with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
        }
    }
}

/// The value type a formula field evaluates to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaResult {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Box<FieldOptions>>,
}

/// Raw Airtable field type.
///
/// Besides the types of the Airtable API, the sync layer exposes sub-properties of
/// compound fields as their own pseudo-types (`barcode.text`, `createdBy.name`...).
/// Types this crate does not name are kept verbatim in [`FieldType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    // ==================== Text ====================
    SingleLineText,
    MultilineText,
    RichText,
    PhoneNumber,
    Url,
    Email,
    BarcodeText,
    Rollup,

    // ==================== Numeric ====================
    AutoNumber,
    Count,
    Currency,
    Duration,
    Number,
    Percent,
    Rating,

    // ==================== Dates ====================
    Date,
    DateTime,
    CreatedTime,
    LastModifiedTime,

    // ==================== Users ====================
    SingleCollaboratorName,
    CreatedByName,
    LastModifiedByName,

    // ==================== Choices & links ====================
    SingleSelect,
    MultipleSelects,
    MultipleRecordLinks,
    MultipleAttachments,
    Checkbox,

    // ==================== Computed ====================
    Formula,

    /// Any other type name.
    Other(String),
}

impl FieldType {
    /// Returns the raw type name.
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::SingleLineText => "singleLineText",
            FieldType::MultilineText => "multilineText",
            FieldType::RichText => "richText",
            FieldType::PhoneNumber => "phoneNumber",
            FieldType::Url => "url",
            FieldType::Email => "email",
            FieldType::BarcodeText => "barcode.text",
            FieldType::Rollup => "rollup",
            FieldType::AutoNumber => "autoNumber",
            FieldType::Count => "count",
            FieldType::Currency => "currency",
            FieldType::Duration => "duration",
            FieldType::Number => "number",
            FieldType::Percent => "percent",
            FieldType::Rating => "rating",
            FieldType::Date => "date",
            FieldType::DateTime => "dateTime",
            FieldType::CreatedTime => "createdTime",
            FieldType::LastModifiedTime => "lastModifiedTime",
            FieldType::SingleCollaboratorName => "singleCollaborator.name",
            FieldType::CreatedByName => "createdBy.name",
            FieldType::LastModifiedByName => "lastModifiedBy.name",
            FieldType::SingleSelect => "singleSelect",
            FieldType::MultipleSelects => "multipleSelects",
            FieldType::MultipleRecordLinks => "multipleRecordLinks",
            FieldType::MultipleAttachments => "multipleAttachments",
            FieldType::Checkbox => "checkbox",
            FieldType::Formula => "formula",
            FieldType::Other(name) => name,
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "singleLineText" => FieldType::SingleLineText,
            "multilineText" => FieldType::MultilineText,
            "richText" => FieldType::RichText,
            "phoneNumber" => FieldType::PhoneNumber,
            "url" => FieldType::Url,
            "email" => FieldType::Email,
            "barcode.text" => FieldType::BarcodeText,
            "rollup" => FieldType::Rollup,
            "autoNumber" => FieldType::AutoNumber,
            "count" => FieldType::Count,
            "currency" => FieldType::Currency,
            "duration" => FieldType::Duration,
            "number" => FieldType::Number,
            "percent" => FieldType::Percent,
            "rating" => FieldType::Rating,
            "date" => FieldType::Date,
            "dateTime" => FieldType::DateTime,
            "createdTime" => FieldType::CreatedTime,
            "lastModifiedTime" => FieldType::LastModifiedTime,
            "singleCollaborator.name" => FieldType::SingleCollaboratorName,
            "createdBy.name" => FieldType::CreatedByName,
            "lastModifiedBy.name" => FieldType::LastModifiedByName,
            "singleSelect" => FieldType::SingleSelect,
            "multipleSelects" => FieldType::MultipleSelects,
            "multipleRecordLinks" => FieldType::MultipleRecordLinks,
            "multipleAttachments" => FieldType::MultipleAttachments,
            "checkbox" => FieldType::Checkbox,
            "formula" => FieldType::Formula,
            _ => FieldType::Other(name),
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        FieldType::from(name.to_string())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
