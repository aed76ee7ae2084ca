//! Classification of schema fields into available filters.
//!
//! Every filterable field gets a [`FilterDescriptor`] whose semantic
//! [`FilterType`] decides which operators and value shapes the compiler accepts
//! for it. Fields without filter semantics are left out.

use std::fmt;

use airtable_schema::{normalize_fields, Field, FieldType, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClassifierConfig;

/// Semantic type of a filterable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    String,
    Number,
    Date,
    User,
    Select,
    MultiSelect,
    LinkToAnotherRecord,
    Attachment,
    Checkbox,
}

impl FilterType {
    /// The serialized name of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::String => "string",
            FilterType::Number => "number",
            FilterType::Date => "date",
            FilterType::User => "user",
            FilterType::Select => "select",
            FilterType::MultiSelect => "multi_select",
            FilterType::LinkToAnotherRecord => "link_to_another_record",
            FilterType::Attachment => "attachment",
            FilterType::Checkbox => "checkbox",
        }
    }

    /// Maps a raw field type to its filter semantics, if any.
    pub fn of(field_type: &FieldType) -> Option<Self> {
        let filter_type = match field_type {
            FieldType::SingleLineText
            | FieldType::BarcodeText
            | FieldType::MultilineText
            | FieldType::PhoneNumber
            | FieldType::RichText
            | FieldType::Url
            | FieldType::Rollup => FilterType::String,

            FieldType::AutoNumber
            | FieldType::Count
            | FieldType::Currency
            | FieldType::Duration
            | FieldType::Number
            | FieldType::Percent
            | FieldType::Rating => FilterType::Number,

            FieldType::Date
            | FieldType::DateTime
            | FieldType::CreatedTime
            | FieldType::LastModifiedTime => FilterType::Date,

            FieldType::SingleCollaboratorName
            | FieldType::CreatedByName
            | FieldType::LastModifiedByName => FilterType::User,

            FieldType::SingleSelect => FilterType::Select,
            FieldType::MultipleSelects => FilterType::MultiSelect,
            FieldType::MultipleRecordLinks => FilterType::LinkToAnotherRecord,
            FieldType::MultipleAttachments => FilterType::Attachment,
            FieldType::Checkbox => FilterType::Checkbox,

            FieldType::Email | FieldType::Formula | FieldType::Other(_) => return None,
        };
        Some(filter_type)
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One choice of a select filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

/// A filterable column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// Field id, unique within a table.
    pub id: String,
    /// Display name, with sub-property suffixes removed.
    pub name: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    /// Choices of select filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FilterOption>>,
}

impl FilterDescriptor {
    /// Creates a descriptor without options.
    pub fn new(id: impl Into<String>, name: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            filter_type,
            options: None,
        }
    }
}

/// Post-processing hook run on the classifier output.
///
/// Extensions run in registration order and may add, remove or edit descriptors.
pub trait FilterExtension: Send + Sync {
    fn extend(&self, filters: &mut Vec<FilterDescriptor>, fields: &[Field]);
}

impl<F> FilterExtension for F
where
    F: Fn(&mut Vec<FilterDescriptor>, &[Field]) + Send + Sync,
{
    fn extend(&self, filters: &mut Vec<FilterDescriptor>, fields: &[Field]) {
        self(filters, fields)
    }
}

/// Turns schema fields into available filters.
pub struct FieldClassifier {
    name_suffix: String,
    value_suffix: String,
    extensions: Vec<Box<dyn FilterExtension>>,
}

impl Default for FieldClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl fmt::Debug for FieldClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldClassifier")
            .field("name_suffix", &self.name_suffix)
            .field("value_suffix", &self.value_suffix)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

impl FieldClassifier {
    /// Creates a classifier using the configured sub-property suffix labels.
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            name_suffix: config.name_suffix.clone(),
            value_suffix: config.value_suffix.clone(),
            extensions: Vec::new(),
        }
    }

    /// Registers an extension, run after the built-in classification.
    pub fn with_extension(mut self, extension: impl FilterExtension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Classifies fields, preserving their order.
    ///
    /// Relationship fields and fields of types without filter semantics are dropped.
    pub fn classify(&self, fields: &[Field]) -> Vec<FilterDescriptor> {
        let mut filters: Vec<FilterDescriptor> =
            fields.iter().filter_map(|f| self.classify_field(f)).collect();

        debug!(
            fields = fields.len(),
            filters = filters.len(),
            extensions = self.extensions.len(),
            "classified fields"
        );

        for extension in &self.extensions {
            extension.extend(&mut filters, fields);
        }
        filters
    }

    /// Normalises formula fields of the table, then classifies them.
    pub fn classify_table(&self, table: &Table) -> Vec<FilterDescriptor> {
        self.classify(&normalize_fields(table.fields.clone()))
    }

    fn classify_field(&self, field: &Field) -> Option<FilterDescriptor> {
        if field.is_relationship() {
            debug!(field = %field.id, "skipping relationship field");
            return None;
        }

        let Some(filter_type) = FilterType::of(&field.field_type) else {
            debug!(field = %field.id, field_type = %field.field_type, "skipping unsupported field");
            return None;
        };

        let name = match field.field_type {
            FieldType::BarcodeText => strip_suffix_label(&field.name, &self.value_suffix),
            FieldType::SingleCollaboratorName
            | FieldType::CreatedByName
            | FieldType::LastModifiedByName => strip_suffix_label(&field.name, &self.name_suffix),
            _ => field.name.as_str(),
        };

        let options = matches!(filter_type, FilterType::Select | FilterType::MultiSelect).then(|| {
            field
                .choices()
                .iter()
                .map(|choice| FilterOption {
                    value: choice.name.clone(),
                    label: choice.name.clone(),
                })
                .collect()
        });

        Some(FilterDescriptor {
            id: field.id.clone(),
            name: name.to_string(),
            filter_type,
            options,
        })
    }
}

/// Classifies fields with the default configuration and no extensions.
pub fn classify_fields(fields: &[Field]) -> Vec<FilterDescriptor> {
    FieldClassifier::default().classify(fields)
}

/// Removes a ` (Label)` suffix from a field name, if present.
///
/// The sync layer names sub-properties of compound fields `Field (Name)`,
/// `Field (Value)`...
pub fn strip_suffix_label<'a>(name: &'a str, label: &str) -> &'a str {
    let suffix = format!(" ({label})");
    name.strip_suffix(suffix.as_str()).unwrap_or(name)
}
