use crate::error::{BlockError, BlockResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Primitive JSON type a schema property may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl PropertyType {
    /// Check whether a JSON value has this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            PropertyType::String => value.is_string(),
            PropertyType::Integer => value.is_i64() || value.is_u64(),
            PropertyType::Number => value.is_number(),
            PropertyType::Boolean => value.is_boolean(),
            PropertyType::Object => value.is_object(),
            PropertyType::Array => value.is_array(),
            PropertyType::Null => value.is_null(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Integer => "integer",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Object => "object",
            PropertyType::Array => "array",
            PropertyType::Null => "null",
        }
    }
}

/// Constraint on a single property of a block's data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: PropertyType,
    /// Enumerated allowed values (`enum` in the schema source)
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
}

impl PropertySchema {
    pub fn of(kind: PropertyType) -> Self {
        Self {
            kind,
            allowed: None,
        }
    }

    pub fn string() -> Self {
        Self::of(PropertyType::String)
    }

    /// Restrict the property to a fixed set of string values
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(
            values
                .into_iter()
                .map(|v| Value::String(v.into()))
                .collect(),
        );
        self
    }

    /// Human-readable rendering of the enumerated values, e.g. `a, b, c`
    pub fn describe_allowed(&self) -> Option<String> {
        self.allowed.as_ref().map(|values| {
            values
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
    }
}

/// Declared shape of a block's data object.
///
/// Mirrors the subset of JSON Schema that block definitions use: an object
/// type, a fixed property set, `additionalProperties`, `required` and `enum`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: PropertyType,
    #[serde(rename = "additionalProperties", default = "default_additional_properties")]
    pub additional_properties: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

fn default_additional_properties() -> bool {
    true
}

impl Schema {
    /// A closed object schema: no properties, unknown fields rejected
    pub fn object() -> Self {
        Self {
            kind: PropertyType::Object,
            additional_properties: false,
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    pub fn property(mut self, name: impl Into<String>, property: PropertySchema) -> Self {
        self.properties.insert(name.into(), property);
        self
    }

    pub fn required_property(mut self, name: impl Into<String>, property: PropertySchema) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, property);
        self
    }

    pub fn allow_additional_properties(mut self) -> Self {
        self.additional_properties = true;
        self
    }

    /// Parse and check a schema written in YAML
    pub fn from_yaml(yaml: &str) -> BlockResult<Self> {
        let schema: Schema = serde_yaml::from_str(yaml)?;
        schema.check()?;
        Ok(schema)
    }

    /// Check that the schema is internally consistent
    pub fn check(&self) -> BlockResult<()> {
        if self.kind != PropertyType::Object {
            return Err(BlockError::InvalidSchema(format!(
                "block schemas must have type 'object', got '{}'",
                self.kind.as_str()
            )));
        }

        for name in &self.required {
            if !self.properties.contains_key(name) {
                return Err(BlockError::InvalidSchema(format!(
                    "required property '{}' is not declared in properties",
                    name
                )));
            }
        }

        for (name, property) in &self.properties {
            if let Some(ref allowed) = property.allowed {
                if allowed.is_empty() {
                    return Err(BlockError::InvalidSchema(format!(
                        "enum for property '{}' must not be empty",
                        name
                    )));
                }
                if let Some(bad) = allowed.iter().find(|v| !property.kind.matches(v)) {
                    return Err(BlockError::InvalidSchema(format!(
                        "enum value {} for property '{}' is not of type {}",
                        bad,
                        name,
                        property.kind.as_str()
                    )));
                }
            }
        }

        Ok(())
    }
}
