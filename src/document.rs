use crate::block::BlockRecord;
use crate::error::{BlockError, BlockResult};
use crate::registry::BlockRegistry;
use serde::{Deserialize, Serialize};

/// An editor document: an ordered sequence of block records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Save timestamp in milliseconds, as written by the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<u64>,
    pub blocks: Vec<BlockRecord>,
    /// Editor version that produced the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Document {
    pub fn new(blocks: Vec<BlockRecord>) -> Self {
        Self {
            time: None,
            blocks,
            version: None,
        }
    }

    /// Parse the editor's JSON save format
    pub fn from_json(json: &str) -> BlockResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// What to do with a block that fails to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop and return the first error
    #[default]
    Abort,
    /// Leave the block out of the output
    Skip,
    /// Render an inline error fragment in the block's place
    Placeholder,
}

/// A block that could not be built, with its position in the document
#[derive(Debug, Clone, PartialEq)]
pub struct BlockFailure {
    pub index: usize,
    pub id: Option<String>,
    pub error: BlockError,
}

/// Rendered output of a whole document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedDocument {
    fragments: Vec<String>,
    plain: Vec<String>,
    failures: Vec<BlockFailure>,
}

impl RenderedDocument {
    /// Block fragments joined by newlines
    pub fn html(&self) -> String {
        self.fragments.join("\n")
    }

    /// Non-empty block projections joined by newlines
    pub fn plain_text(&self) -> String {
        self.plain
            .iter()
            .filter(|p| !p.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn failures(&self) -> &[BlockFailure] {
        &self.failures
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Renders documents through a registry, one block at a time
pub struct DocumentRenderer<'a> {
    registry: &'a BlockRegistry,
    policy: FailurePolicy,
    css_prefix: String,
}

impl<'a> DocumentRenderer<'a> {
    pub fn new(registry: &'a BlockRegistry) -> Self {
        Self {
            registry,
            policy: FailurePolicy::default(),
            css_prefix: crate::config::DEFAULT_CSS_PREFIX.to_string(),
        }
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Class prefix for placeholder fragments
    pub fn css_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.css_prefix = prefix.into();
        self
    }

    pub fn render(&self, document: &Document) -> BlockResult<RenderedDocument> {
        let mut out = RenderedDocument::default();

        for (index, record) in document.blocks.iter().enumerate() {
            match self.registry.build_record(record.clone()) {
                Ok(block) => {
                    out.fragments.push(block.render());
                    out.plain.push(block.plain_text());
                }
                Err(error) => match self.policy {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::Skip => {
                        log::warn!("skipping block {} ('{}'): {}", index, record.block_type, error);
                        out.failures.push(failure(index, record, error));
                    }
                    FailurePolicy::Placeholder => {
                        log::warn!(
                            "replacing block {} ('{}') with placeholder: {}",
                            index,
                            record.block_type,
                            error
                        );
                        out.fragments.push(self.placeholder(&error));
                        out.failures.push(failure(index, record, error));
                    }
                },
            }
        }

        Ok(out)
    }

    fn placeholder(&self, error: &BlockError) -> String {
        format!(
            r#"<div class="{}--error">{}</div>"#,
            html_escape::encode_double_quoted_attribute(&self.css_prefix),
            html_escape::encode_text(&error.to_string())
        )
    }
}

fn failure(index: usize, record: &BlockRecord, error: BlockError) -> BlockFailure {
    BlockFailure {
        index,
        id: record.id.clone(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;

    const DOC: &str = r#"{
        "time": 1700000000000,
        "blocks": [
            { "id": "a1", "type": "paragraph", "data": { "text": "First <b>one</b>" } },
            { "id": "b2", "type": "table", "data": { "content": [] } },
            { "id": "c3", "type": "url", "data": { "url": "example.com" } }
        ],
        "version": "2.28.2"
    }"#;

    fn registry() -> BlockRegistry {
        BlockRegistry::with_default_blocks(&RenderConfig::default()).unwrap()
    }

    #[test]
    fn test_from_json() {
        let doc = Document::from_json(DOC).unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.time, Some(1700000000000));
        assert_eq!(doc.version.as_deref(), Some("2.28.2"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Document::from_json("{ \"blocks\": 3 }"),
            Err(BlockError::DeserializationError(_))
        ));
    }

    #[test]
    fn test_abort_policy() {
        let registry = registry();
        let doc = Document::from_json(DOC).unwrap();
        let err = DocumentRenderer::new(&registry).render(&doc).unwrap_err();
        assert!(matches!(err, BlockError::UnknownBlockType { .. }));
    }

    #[test]
    fn test_skip_policy() {
        let registry = registry();
        let doc = Document::from_json(DOC).unwrap();
        let out = DocumentRenderer::new(&registry)
            .policy(FailurePolicy::Skip)
            .render(&doc)
            .unwrap();
        assert_eq!(out.fragments().len(), 2);
        assert_eq!(out.failures().len(), 1);
        assert_eq!(out.failures()[0].index, 1);
        assert_eq!(out.failures()[0].id.as_deref(), Some("b2"));
        assert_eq!(out.plain_text(), "First one\nexample.com");
    }

    #[test]
    fn test_placeholder_policy() {
        let registry = registry();
        let doc = Document::from_json(DOC).unwrap();
        let out = DocumentRenderer::new(&registry)
            .policy(FailurePolicy::Placeholder)
            .render(&doc)
            .unwrap();
        assert_eq!(out.fragments().len(), 3);
        assert_eq!(
            out.fragments()[1],
            r#"<div class="editorjs--error">Unknown block type 'table': no implementation registered</div>"#
        );
        assert!(!out.is_clean());
    }

    #[test]
    fn test_empty_document() {
        let registry = registry();
        let out = DocumentRenderer::new(&registry)
            .render(&Document::default())
            .unwrap();
        assert_eq!(out.html(), "");
        assert_eq!(out.plain_text(), "");
        assert!(out.is_clean());
    }
}
