use super::escape_attr;
use crate::block::{sanitize_fields, str_field, BlockData, BlockKind};
use crate::config::RenderConfig;
use crate::sanitizer::{self, AllowList, Sanitizer};
use crate::schema::{PropertySchema, Schema};

pub const TYPE: &str = "paragraph";

pub const ALIGNMENTS: &[&str] = &["align-left", "align-center", "align-right"];

/// Inline formatting the paragraph tool can produce
pub const ALLOWED_TAGS: AllowList = AllowList::new(&[
    ("b", None),
    ("i", None),
    ("u", Some(&["class"])),
    ("del", Some(&["class"])),
    ("a", Some(&["href"])),
    ("mark", Some(&["class"])),
    ("code", Some(&["class"])),
]);

/// A paragraph of inline rich text with optional alignment
pub struct ParagraphBlock {
    css_name: String,
    schema: Schema,
    sanitizer: Sanitizer,
}

impl ParagraphBlock {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            css_name: config.css_name(TYPE),
            schema: Schema::object()
                .required_property("text", PropertySchema::string())
                .property(
                    "alignment",
                    PropertySchema::string().one_of(ALIGNMENTS.iter().copied()),
                ),
            sanitizer: Sanitizer::new(&ALLOWED_TAGS),
        }
    }

    fn class_list(&self, alignment: &str) -> String {
        if alignment.is_empty() {
            self.css_name.clone()
        } else {
            format!("{0} {0}__{1}", self.css_name, alignment)
        }
    }
}

impl BlockKind for ParagraphBlock {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn sanitize(&self, data: BlockData) -> BlockData {
        sanitize_fields(data, &["text"], &self.sanitizer)
    }

    fn render(&self, data: &BlockData) -> String {
        let class = self.class_list(str_field(data, "alignment"));
        format!(
            r#"<div class="{}">{}</div>"#,
            escape_attr(&class),
            str_field(data, "text")
        )
    }

    fn plain_text(&self, data: &BlockData) -> String {
        sanitizer::plain_text(str_field(data, "text"))
    }
}
