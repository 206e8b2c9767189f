use super::escape_attr;
use crate::block::{sanitize_fields, str_field, BlockData, BlockKind};
use crate::config::RenderConfig;
use crate::link::{HostAllowList, LinkState, ParsedUrl, EXTERNAL_TARGET};
use crate::sanitizer::{self, AllowList, Sanitizer};
use crate::schema::{PropertySchema, Schema};

pub const TYPE: &str = "url";

pub const ALLOWED_TAGS: AllowList = AllowList::new(&[
    ("b", None),
    ("i", None),
    ("u", Some(&["class"])),
    ("del", Some(&["class"])),
    ("a", Some(&["href", "target", "class"])),
    ("mark", Some(&["class"])),
    ("code", Some(&["class"])),
]);

/// A single link, opened in place or in a new window depending on its host
pub struct UrlBlock {
    css_name: String,
    hosts: HostAllowList,
    schema: Schema,
    sanitizer: Sanitizer,
}

impl UrlBlock {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            css_name: config.css_name(TYPE),
            hosts: config.host_allow_list(),
            schema: Schema::object().required_property("url", PropertySchema::string()),
            sanitizer: Sanitizer::new(&ALLOWED_TAGS),
        }
    }

    /// Classify the stored (sanitized, entity-encoded) url field
    pub fn link_state(&self, data: &BlockData) -> LinkState {
        let raw = html_escape::decode_html_entities(str_field(data, "url"));
        LinkState::classify(raw.trim(), &self.hosts)
    }

    fn anchor(&self, url: &ParsedUrl, target: Option<&str>) -> String {
        let href = escape_attr(url.as_str());
        let target = target
            .map(|t| format!(r#" target="{}""#, t))
            .unwrap_or_default();
        format!(
            r#"<div class="{css}"><a href="{href}"{target} class="{css}-link">{text}</a></div>"#,
            css = escape_attr(&self.css_name),
            href = href,
            target = target,
            text = html_escape::encode_text(url.as_str()),
        )
    }

    fn warning(&self) -> String {
        format!(
            r#"<div class="{css}"><i class="{css}-invalid">(invalid url)</i></div>"#,
            css = escape_attr(&self.css_name),
        )
    }
}

impl BlockKind for UrlBlock {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn sanitize(&self, data: BlockData) -> BlockData {
        sanitize_fields(data, &["url"], &self.sanitizer)
    }

    fn render(&self, data: &BlockData) -> String {
        match self.link_state(data) {
            LinkState::Invalid(err) => {
                log::warn!(
                    "url block: rendering warning for {:?}: {}",
                    str_field(data, "url"),
                    err
                );
                self.warning()
            }
            LinkState::Internal(url) => self.anchor(&url, None),
            LinkState::External(url) => self.anchor(&url, Some(EXTERNAL_TARGET)),
        }
    }

    fn plain_text(&self, data: &BlockData) -> String {
        sanitizer::plain_text(str_field(data, "url"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn data(url: &str) -> BlockData {
        match json!({ "url": url }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn block() -> UrlBlock {
        UrlBlock::new(&RenderConfig::new().with_internal_hosts(["localhost"]))
    }

    #[test]
    fn test_external_link_opens_blank() {
        let html = block().render(&data("example.com"));
        assert_eq!(
            html,
            r#"<div class="editorjs--url"><a href="http://example.com" target="_blank" class="editorjs--url-link">http://example.com</a></div>"#
        );
    }

    #[test]
    fn test_relative_link_has_no_target() {
        let html = block().render(&data("/plays/2"));
        assert_eq!(
            html,
            r#"<div class="editorjs--url"><a href="/plays/2" class="editorjs--url-link">/plays/2</a></div>"#
        );
    }

    #[test]
    fn test_allow_listed_host_has_no_target() {
        let html = block().render(&data("http://LOCALHOST:3000/plays"));
        assert!(!html.contains("target="));
        assert!(html.contains(r#"href="http://LOCALHOST:3000/plays""#));
    }

    #[test]
    fn test_invalid_url_renders_warning() {
        let expected = r#"<div class="editorjs--url"><i class="editorjs--url-invalid">(invalid url)</i></div>"#;
        assert_eq!(block().render(&data("http://example.com/%zz")), expected);
        assert_eq!(block().render(&data("exa mple.com")), expected);
        assert_eq!(block().render(&data("")), expected);
        assert_eq!(block().render(&data("javascript:alert(1)")), expected);
    }

    #[test]
    fn test_ampersand_survives_sanitize_and_render() {
        let block = block();
        let clean = block.sanitize(data("https://example.com/?a=1&b=2"));
        assert_eq!(str_field(&clean, "url"), "https://example.com/?a=1&amp;b=2");

        let html = block.render(&clean);
        assert!(html.contains(r#"href="https://example.com/?a=1&amp;b=2""#));
        assert!(html.contains(">https://example.com/?a=1&amp;b=2</a>"));
    }

    #[test]
    fn test_markup_in_url_is_stripped_before_render() {
        let block = block();
        let clean = block.sanitize(data("<script>x</script>example.com"));
        assert_eq!(str_field(&clean, "url"), "example.com");
        assert!(block.render(&clean).contains(r#"href="http://example.com""#));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(matches!(
            block().link_state(&data("  example.com ")),
            LinkState::External(_)
        ));
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(block().plain_text(&data(" example.com/?a=1&amp;b=2 ")), "example.com/?a=1&b=2");
    }
}
