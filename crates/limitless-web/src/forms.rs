//! Conversion between form inputs and field mappings
//!
//! Forms hold raw text per field. Values are parsed against the kind's schema
//! when the form is submitted; schema validation proper happens in the
//! management screen before any request is sent.

use limitless_core::{Error, FieldSpec, FieldType, FieldValue, Fields, ManagedEntity, Result};
use std::collections::BTreeMap;

/// Raw text of each form input, keyed by field name
pub type Draft = BTreeMap<String, String>;

/// Parse one raw input; a blank input is [`FieldValue::Null`]
///
/// # Errors
///
/// Returns a validation error when the text cannot be read as the field's type.
pub fn parse_input(spec: &FieldSpec, raw: &str) -> Result<FieldValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(FieldValue::Null);
    }

    match spec.field_type {
        FieldType::Text | FieldType::Email | FieldType::Url | FieldType::Choice(_) => {
            Ok(FieldValue::from(trimmed))
        }
        FieldType::LongText => Ok(FieldValue::from(raw)),
        FieldType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "yes" | "true" | "on" | "1" => Ok(FieldValue::Bool(true)),
            "no" | "false" | "off" | "0" => Ok(FieldValue::Bool(false)),
            _ => Err(Error::validation(spec.name, "must be yes or no")),
        },
        FieldType::Integer => trimmed
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| Error::validation(spec.name, "must be a whole number")),
        FieldType::Tags => Ok(FieldValue::List(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(String::from)
                .collect(),
        )),
    }
}

/// Text to pre-fill an input with
#[must_use]
pub fn input_text(value: Option<&FieldValue>) -> String {
    match value {
        Some(FieldValue::Bool(true)) => "yes".to_string(),
        Some(FieldValue::Bool(false)) => "no".to_string(),
        Some(other) => other.display(),
        None => String::new(),
    }
}

/// Draft pre-filled from a record's current values
#[must_use]
pub fn draft_from_entity(entity: &ManagedEntity) -> Draft {
    entity
        .kind
        .schema()
        .iter()
        .map(|spec| (spec.name.to_string(), input_text(entity.field(spec.name))))
        .collect()
}

/// Field mapping for a create form; blank inputs are left out
///
/// # Errors
///
/// Returns the first input that cannot be parsed.
pub fn create_fields(schema: &[FieldSpec], draft: &Draft) -> Result<Fields> {
    let mut fields = Fields::new();
    for spec in schema {
        let Some(raw) = draft.get(spec.name) else {
            continue;
        };
        match parse_input(spec, raw)? {
            FieldValue::Null => {}
            value => {
                fields.insert(spec.name.to_string(), value);
            }
        }
    }
    Ok(fields)
}

/// Partial field mapping holding only the inputs that differ from `entity`
///
/// Clearing an input that had a value produces [`FieldValue::Null`].
///
/// # Errors
///
/// Returns the first input that cannot be parsed.
pub fn changed_fields(entity: &ManagedEntity, draft: &Draft) -> Result<Fields> {
    let mut changes = Fields::new();
    for spec in entity.kind.schema() {
        let Some(raw) = draft.get(spec.name) else {
            continue;
        };
        let value = parse_input(spec, raw)?;
        let current = entity.field(spec.name).unwrap_or(&FieldValue::Null);
        if value != *current {
            changes.insert(spec.name.to_string(), value);
        }
    }
    Ok(changes)
}
