use crate::schema::Schema;
use crate::sanitizer::Sanitizer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Field name → value payload of a block, in authored order
pub type BlockData = Map<String, Value>;

/// A block exactly as the editor saved it, before any checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default = "empty_data")]
    pub data: Value,
}

fn empty_data() -> Value {
    Value::Object(Map::new())
}

impl BlockRecord {
    pub fn new(block_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: None,
            block_type: block_type.into(),
            data,
        }
    }
}

/// Behaviour shared by every block type.
///
/// `render` and `plain_text` only ever see data that already passed
/// [`schema`](BlockKind::schema) and went through
/// [`sanitize`](BlockKind::sanitize) once.
pub trait BlockKind: Send + Sync {
    fn schema(&self) -> &Schema;

    /// Produce the sanitized copy of validated data
    fn sanitize(&self, data: BlockData) -> BlockData;

    fn render(&self, data: &BlockData) -> String;

    fn plain_text(&self, data: &BlockData) -> String;
}

/// Replace each named string field with its sanitized form
pub fn sanitize_fields(mut data: BlockData, fields: &[&str], sanitizer: &Sanitizer) -> BlockData {
    for field in fields {
        if let Some(Value::String(text)) = data.get_mut(*field) {
            *text = sanitizer.clean(text);
        }
    }
    data
}

/// Read a string field, treating absence as empty
pub fn str_field<'a>(data: &'a BlockData, field: &str) -> &'a str {
    data.get(field).and_then(Value::as_str).unwrap_or("")
}

/// A validated, sanitized block ready for rendering.
///
/// Only the registry can create one, and nothing can change it afterwards.
#[derive(Clone)]
pub struct Block {
    block_type: String,
    data: BlockData,
    kind: Arc<dyn BlockKind>,
}

impl Block {
    pub(crate) fn new(block_type: String, data: BlockData, kind: Arc<dyn BlockKind>) -> Self {
        Self {
            block_type,
            data,
            kind,
        }
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    /// Sanitized data payload
    pub fn data(&self) -> &BlockData {
        &self.data
    }

    pub fn render(&self) -> String {
        self.kind.render(&self.data)
    }

    pub fn plain_text(&self) -> String {
        self.kind.plain_text(&self.data)
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("block_type", &self.block_type)
            .field("data", &self.data)
            .finish()
    }
}
