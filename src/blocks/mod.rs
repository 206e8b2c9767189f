//! Built-in block types.

pub mod paragraph;
pub mod url_block;

pub use paragraph::ParagraphBlock;
pub use url_block::UrlBlock;

/// Escape text for use inside a double-quoted HTML attribute
pub(crate) fn escape_attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}
