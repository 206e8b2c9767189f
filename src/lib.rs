//! # Editor.js block rendering
//!
//! Turns block-editor documents into HTML that is safe to embed, and into plain
//! text for previews and search indexing.
//!
//! ## Pipeline
//! - Each block's data is checked against its type's schema
//! - Text fields are sanitized once against a per-type tag allow-list
//! - Sanitized blocks render to an HTML fragment or a plain-text projection
//! - Links are classified as internal or external using a configured host list
//!
//! ## Example: single block
//! ```ignore
//! use editorjs_blocks::{BlockRegistry, RenderConfig};
//! use serde_json::json;
//!
//! let config = RenderConfig::new().with_internal_hosts(["localhost"]);
//! let registry = BlockRegistry::with_default_blocks(&config)?;
//!
//! let block = registry.build("paragraph", json!({
//!     "text": "Hello <b>world</b><script>alert(1)</script>",
//!     "alignment": "align-center"
//! }))?;
//!
//! assert_eq!(block.plain_text(), "Hello world");
//! ```
//!
//! ## Example: whole document
//! ```ignore
//! use editorjs_blocks::{render_document, FailurePolicy, RenderConfig};
//!
//! let json = std::fs::read_to_string("post.json")?;
//! let rendered = render_document(&json, &RenderConfig::from_env()?, FailurePolicy::Placeholder)?;
//! println!("{}", rendered.html());
//! ```

pub mod block;
pub mod blocks;
pub mod config;
pub mod document;
pub mod error;
pub mod link;
pub mod registry;
pub mod sanitizer;
pub mod schema;
pub mod validator;

// --- Core types ---
pub use block::{Block, BlockData, BlockKind, BlockRecord};
pub use config::RenderConfig;
pub use document::{BlockFailure, Document, DocumentRenderer, FailurePolicy, RenderedDocument};
pub use error::{BlockError, BlockResult, InvalidUrl};
pub use registry::BlockRegistry;
pub use schema::{PropertySchema, PropertyType, Schema};

// --- Pipeline stages ---
pub use link::{add_protocol, parse_url, HostAllowList, LinkState, ParsedUrl};
pub use sanitizer::{sanitize, AllowList, Sanitizer};
pub use validator::validate;

/// Parse an editor JSON document and render it with the built-in block types
pub fn render_document(
    json: &str,
    config: &RenderConfig,
    policy: FailurePolicy,
) -> BlockResult<RenderedDocument> {
    let document = Document::from_json(json)?;
    let registry = BlockRegistry::with_default_blocks(config)?;
    DocumentRenderer::new(&registry)
        .policy(policy)
        .css_prefix(config.css_prefix.clone())
        .render(&document)
}

/// Build a single block with the built-in block types
pub fn build_block(
    block_type: &str,
    data: serde_json::Value,
    config: &RenderConfig,
) -> BlockResult<Block> {
    BlockRegistry::with_default_blocks(config)?.build(block_type, data)
}
