use thiserror::Error;

pub type BlockResult<T> = Result<T, BlockError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockError {
    #[error("Schema violation in '{block_type}' block, field '{field}': {reason}")]
    SchemaViolation {
        block_type: String,
        field: String,
        reason: String,
    },

    #[error("Unknown block type '{block_type}': no implementation registered")]
    UnknownBlockType { block_type: String },

    #[error("Block type '{block_type}' is already registered")]
    DuplicateBlockType { block_type: String },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("YAML error: {0}")]
    YamlError(String),
}

impl BlockError {
    /// Field named by a schema violation, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            BlockError::SchemaViolation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BlockError {
    fn from(err: serde_json::Error) -> Self {
        BlockError::DeserializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for BlockError {
    fn from(err: serde_yaml::Error) -> Self {
        BlockError::YamlError(err.to_string())
    }
}

/// Why a candidate URL could not be turned into a link.
///
/// Not a [`BlockError`]: URL blocks recover from it by rendering a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidUrl {
    #[error("URL is empty")]
    Empty,

    #[error("URL contains illegal character {character:?} at byte {position}")]
    IllegalCharacter { character: char, position: usize },

    #[error("URL contains a malformed percent escape at byte {position}")]
    MalformedEscape { position: usize },

    #[error("URL scheme '{scheme}' is not allowed; expected http or https")]
    UnsupportedScheme { scheme: String },

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

impl From<url::ParseError> for InvalidUrl {
    fn from(err: url::ParseError) -> Self {
        InvalidUrl::Malformed(err.to_string())
    }
}
