//! Response validation against the changelog schema.
//!
//! Model output is accepted whole or not at all. Providers are asked to
//! enforce the schema themselves, but their enforcement varies, so the
//! response is checked again here against the same [`SchemaDefinition`].

use serde_json::Value;
use thiserror::Error;

use crate::models::ChangelogEntry;
use crate::schema::{FieldKind, ObjectSchema, SchemaDefinition};

/// Model output that does not match the expected structure.
///
/// Carries the full response so it can be shown to the user or replayed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("model response does not match the changelog schema: {reason}\nResponse: {raw}")]
pub struct SchemaViolation {
    pub raw: String,
    pub reason: String,
}

/// Parse and check a raw model response.
pub fn validate(raw: &str, schema: &SchemaDefinition) -> Result<ChangelogEntry, SchemaViolation> {
    let violation = |reason: String| SchemaViolation {
        raw: raw.to_string(),
        reason,
    };

    let value: Value =
        serde_json::from_str(raw.trim()).map_err(|e| violation(format!("not valid JSON: {e}")))?;
    check_object(&value, &schema.root, "$").map_err(violation)?;

    serde_json::from_value(value).map_err(|e| violation(e.to_string()))
}

fn check_object(value: &Value, schema: &ObjectSchema, path: &str) -> Result<(), String> {
    let Some(map) = value.as_object() else {
        return Err(format!("{path}: expected an object"));
    };

    for field in &schema.fields {
        let child = format!("{path}.{}", field.name);
        match map.get(field.name) {
            Some(v) => check_value(v, &field.kind, &child)?,
            None if field.required => return Err(format!("{child}: missing required field")),
            None => {}
        }
    }
    Ok(())
}

fn check_value(value: &Value, kind: &FieldKind, path: &str) -> Result<(), String> {
    match kind {
        FieldKind::String => {
            if !value.is_string() {
                return Err(format!("{path}: expected a string"));
            }
        }
        FieldKind::Enum(allowed) => {
            let Some(s) = value.as_str() else {
                return Err(format!("{path}: expected a string"));
            };
            if !allowed.iter().any(|a| a == s) {
                return Err(format!(
                    "{path}: '{s}' is not one of: {}",
                    allowed.join(", ")
                ));
            }
        }
        FieldKind::Array { items, min_items } => {
            let Some(arr) = value.as_array() else {
                return Err(format!("{path}: expected an array"));
            };
            if arr.len() < *min_items {
                return Err(format!(
                    "{path}: expected at least {min_items} item(s), got {}",
                    arr.len()
                ));
            }
            for (i, item) in arr.iter().enumerate() {
                check_value(item, items, &format!("{path}[{i}]"))?;
            }
        }
        FieldKind::Object(obj) => check_object(value, obj, path)?,
    }
    Ok(())
}
