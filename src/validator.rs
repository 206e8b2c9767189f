use crate::error::{BlockError, BlockResult};
use crate::schema::Schema;
use serde_json::{Map, Value};

/// Validate a block's raw data payload against its schema.
///
/// Reports the first violation found. Checks run in a fixed order: payload
/// shape, unknown fields, missing required fields, then per-property type and
/// enum constraints in declaration order.
pub fn validate(block_type: &str, schema: &Schema, data: &Value) -> BlockResult<()> {
    match data {
        Value::Object(map) => validate_object(block_type, schema, map),
        other => Err(not_an_object(block_type, other)),
    }
}

/// Take the data map out of a raw payload, rejecting non-objects
pub fn into_object(block_type: &str, data: Value) -> BlockResult<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(not_an_object(block_type, &other)),
    }
}

fn not_an_object(block_type: &str, value: &Value) -> BlockError {
    violation(
        block_type,
        "data",
        format!("expected an object, got {}", json_type_name(value)),
    )
}

/// Validate an already-extracted data map
pub fn validate_object(
    block_type: &str,
    schema: &Schema,
    data: &Map<String, Value>,
) -> BlockResult<()> {
    if !schema.additional_properties {
        if let Some(unknown) = data.keys().find(|k| !schema.properties.contains_key(*k)) {
            return Err(violation(
                block_type,
                unknown,
                format!(
                    "unknown field; allowed fields are: {}",
                    schema
                        .properties
                        .keys()
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
        }
    }

    for name in &schema.required {
        if !data.contains_key(name) {
            return Err(violation(block_type, name, "missing required field".to_string()));
        }
    }

    for (name, property) in &schema.properties {
        let Some(value) = data.get(name) else {
            continue;
        };

        if !property.kind.matches(value) {
            return Err(violation(
                block_type,
                name,
                format!(
                    "expected {}, got {}",
                    property.kind.as_str(),
                    json_type_name(value)
                ),
            ));
        }

        if let Some(ref allowed) = property.allowed {
            if !allowed.contains(value) {
                return Err(violation(
                    block_type,
                    name,
                    format!(
                        "value {} is not allowed; expected one of: {}",
                        value,
                        property.describe_allowed().unwrap_or_default()
                    ),
                ));
            }
        }
    }

    Ok(())
}

fn violation(block_type: &str, field: &str, reason: String) -> BlockError {
    BlockError::SchemaViolation {
        block_type: block_type.to_string(),
        field: field.to_string(),
        reason,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
