use crate::block::{Block, BlockKind, BlockRecord};
use crate::blocks::{paragraph, url_block, ParagraphBlock, UrlBlock};
use crate::config::RenderConfig;
use crate::error::{BlockError, BlockResult};
use crate::validator;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps block type tags to their implementations and builds ready blocks
#[derive(Clone, Default)]
pub struct BlockRegistry {
    kinds: BTreeMap<String, Arc<dyn BlockKind>>,
}

impl BlockRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `paragraph` and `url` blocks
    pub fn with_default_blocks(config: &RenderConfig) -> BlockResult<Self> {
        config.validate()?;
        let mut registry = Self::new();
        registry.register(paragraph::TYPE, Arc::new(ParagraphBlock::new(config)))?;
        registry.register(url_block::TYPE, Arc::new(UrlBlock::new(config)))?;
        Ok(registry)
    }

    /// Associate a type tag with an implementation. Tags are registered once.
    pub fn register(
        &mut self,
        type_tag: impl Into<String>,
        kind: Arc<dyn BlockKind>,
    ) -> BlockResult<()> {
        let type_tag = type_tag.into();
        if self.kinds.contains_key(&type_tag) {
            return Err(BlockError::DuplicateBlockType {
                block_type: type_tag,
            });
        }
        kind.schema().check()?;
        log::debug!("registered block type '{}'", type_tag);
        self.kinds.insert(type_tag, kind);
        Ok(())
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.kinds.contains_key(type_tag)
    }

    pub fn type_tags(&self) -> Vec<&str> {
        self.kinds.keys().map(String::as_str).collect()
    }

    pub fn get(&self, type_tag: &str) -> Option<&Arc<dyn BlockKind>> {
        self.kinds.get(type_tag)
    }

    /// Validate and sanitize raw data into a [`Block`].
    ///
    /// The raw data is consumed; on error no block exists.
    pub fn build(&self, type_tag: &str, data: Value) -> BlockResult<Block> {
        let kind = self
            .get(type_tag)
            .ok_or_else(|| BlockError::UnknownBlockType {
                block_type: type_tag.to_string(),
            })?;

        let raw = validator::into_object(type_tag, data)?;
        validator::validate_object(type_tag, kind.schema(), &raw)?;

        let sanitized = kind.sanitize(raw);
        log::debug!("built '{}' block with {} field(s)", type_tag, sanitized.len());

        Ok(Block::new(type_tag.to_string(), sanitized, Arc::clone(kind)))
    }

    pub fn build_record(&self, record: BlockRecord) -> BlockResult<Block> {
        self.build(&record.block_type, record.data)
    }
}

impl std::fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("types", &self.type_tags())
            .finish()
    }
}
