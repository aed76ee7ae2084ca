//! Normalisation of computed (`formula`) fields.
//!
//! A formula field is filtered and synced according to the type of value it
//! evaluates to, so it is replaced by a field of its result type that keeps the
//! formula's own id, name and description.

use crate::field::{Field, FieldType};

/// Replaces every formula field with a field of its declared result type.
///
/// Formula fields without a declared result are returned unchanged. Order is preserved.
pub fn normalize_fields(fields: Vec<Field>) -> Vec<Field> {
    fields.into_iter().map(resolve_formula).collect()
}

/// Resolves a single formula field; other fields pass through.
pub fn resolve_formula(field: Field) -> Field {
    if field.field_type != FieldType::Formula {
        return field;
    }

    let Some(result) = field.options.as_ref().and_then(|o| o.result.as_deref()) else {
        return field;
    };

    Field {
        field_type: result.field_type.clone(),
        options: result.options.as_deref().cloned(),
        description: Some(field.description.clone().unwrap_or_default()),
        id: field.id,
        name: field.name,
    }
}
