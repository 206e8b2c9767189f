//! Allow-list HTML sanitization for user-authored block fields.
//!
//! Two passes. A `lol_html` rewrite first deletes every element outside the
//! block's allow-list together with everything inside it, whatever the tag
//! name. `ammonia` then reparses the remainder and enforces attribute and
//! URL-scheme rules on the tags that are left.

use ammonia::Builder;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// URL schemes kept on allowed URL attributes such as `a[href]`
const URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Elements whose contents are dropped when stripping a fragment to text
const STRIP_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template", "iframe"];

/// Allowed tags for one block type, each with the attributes it may keep.
///
/// `None` means the tag is allowed but every attribute is stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowList {
    entries: &'static [(&'static str, Option<&'static [&'static str]>)],
}

impl AllowList {
    pub const fn new(entries: &'static [(&'static str, Option<&'static [&'static str]>)]) -> Self {
        Self { entries }
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(tag, _)| *tag)
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.entries.iter().any(|(t, _)| t.eq_ignore_ascii_case(tag))
    }

    /// Attributes kept on `tag`; empty when the tag keeps none or is not allowed
    pub fn attributes(&self, tag: &str) -> &'static [&'static str] {
        self.entries
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(tag))
            .and_then(|(_, attrs)| *attrs)
            .unwrap_or(&[])
    }
}

/// A compiled sanitization policy, reusable across calls
pub struct Sanitizer {
    /// Elements outside this list are removed with their contents
    allow: Option<AllowList>,
    cleaner: Builder<'static>,
}

impl Sanitizer {
    pub fn new(allow: &AllowList) -> Self {
        let tags: HashSet<&'static str> = allow.tags().collect();

        let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = allow
            .entries
            .iter()
            .filter_map(|(tag, attrs)| attrs.map(|a| (*tag, a.iter().copied().collect())))
            .collect();

        let clean_content: HashSet<&'static str> = STRIP_CONTENT_TAGS
            .iter()
            .copied()
            .filter(|tag| !tags.contains(tag))
            .collect();

        let mut cleaner = Builder::empty();
        cleaner
            .tags(tags)
            .tag_attributes(tag_attributes)
            .clean_content_tags(clean_content)
            .url_schemes(URL_SCHEMES.iter().copied().collect())
            .link_rel(None)
            .strip_comments(true);

        Self {
            allow: Some(*allow),
            cleaner,
        }
    }

    /// A policy that keeps no tags at all, only their text
    pub fn strip_all() -> Self {
        let mut cleaner = Builder::empty();
        cleaner
            .clean_content_tags(STRIP_CONTENT_TAGS.iter().copied().collect())
            .strip_comments(true);
        Self {
            allow: None,
            cleaner,
        }
    }

    pub fn clean(&self, text: &str) -> String {
        match self.allow {
            Some(allow) => match remove_disallowed(text, allow) {
                Some(pruned) => self.cleaner.clean(&pruned).to_string(),
                None => String::new(),
            },
            None => self.cleaner.clean(text).to_string(),
        }
    }
}

/// Delete every element not on the allow-list, subtree included.
///
/// Returns `None` when the rewriter gives up, so callers fail closed.
fn remove_disallowed(text: &str, allow: AllowList) -> Option<String> {
    let result = rewrite_str(
        text,
        RewriteStrSettings {
            element_content_handlers: vec![element!("*", move |el| {
                if !allow.allows_tag(&el.tag_name()) {
                    el.remove();
                }
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );

    match result {
        Ok(pruned) => Some(pruned),
        Err(err) => {
            log::warn!("discarding fragment the HTML rewriter rejected: {}", err);
            None
        }
    }
}

/// Sanitize a fragment against an allow-list
pub fn sanitize(text: &str, allow: &AllowList) -> String {
    Sanitizer::new(allow).clean(text)
}

/// Remove every tag from a fragment, keeping (still escaped) text
pub fn strip_tags(text: &str) -> String {
    static STRIPPER: OnceLock<Sanitizer> = OnceLock::new();
    STRIPPER.get_or_init(Sanitizer::strip_all).clean(text)
}

/// Plain-text projection of a sanitized fragment.
///
/// Tags are stripped before entities are decoded, so an encoded `&lt;b&gt;`
/// comes back as the literal text `<b>` rather than as markup.
pub fn plain_text(text: &str) -> String {
    let stripped = strip_tags(text);
    html_escape::decode_html_entities(&stripped).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INLINE: AllowList = AllowList::new(&[
        ("b", None),
        ("i", None),
        ("u", Some(&["class"])),
        ("a", Some(&["href"])),
    ]);

    #[test]
    fn test_allowed_tags_survive() {
        assert_eq!(sanitize("<b>bold</b> and <i>italic</i>", &INLINE), "<b>bold</b> and <i>italic</i>");
    }

    #[test]
    fn test_disallowed_tag_removed_with_contents() {
        let out = sanitize("Hi <script>alert(1)</script>there", &INLINE);
        assert_eq!(out, "Hi there");
    }

    #[test]
    fn test_disallowed_container_drops_allowed_children() {
        let out = sanitize("<div>gone <b>too</b></div><b>kept</b>", &INLINE);
        assert_eq!(out, "<b>kept</b>");
    }

    #[test]
    fn test_unrecognized_tags_removed_with_contents() {
        assert_eq!(sanitize("<foo>secret</foo>ok", &INLINE), "ok");
        assert_eq!(sanitize("<x-widget>hidden <b>b</b></x-widget>ok", &INLINE), "ok");
        assert_eq!(sanitize("<my-script>alert(1)</my-script>", &INLINE), "");
        assert_eq!(sanitize("<b>keep <Custom-Tag>drop</Custom-Tag></b>", &INLINE), "<b>keep </b>");
    }

    #[test]
    fn test_unclosed_disallowed_tag_drops_the_rest() {
        let out = sanitize("before <foo>after", &INLINE);
        assert!(!out.contains("after"), "kept text of unclosed tag: {:?}", out);
        assert!(out.starts_with("before"));
    }

    #[test]
    fn test_attribute_not_listed_is_stripped() {
        let out = sanitize(r#"<u class="x" style="color:red" onclick="evil()">u</u>"#, &INLINE);
        assert_eq!(out, r#"<u class="x">u</u>"#);
    }

    #[test]
    fn test_no_attribute_tag_loses_all_attributes() {
        let out = sanitize(r#"<b class="loud" id="x">b</b>"#, &INLINE);
        assert_eq!(out, "<b>b</b>");
    }

    #[test]
    fn test_javascript_href_removed() {
        let out = sanitize(r#"<a href="javascript:alert(1)">x</a>"#, &INLINE);
        assert_eq!(out, "<a>x</a>");
    }

    #[test]
    fn test_relative_href_kept() {
        let out = sanitize(r#"<a href="/plays/2">x</a>"#, &INLINE);
        assert_eq!(out, r#"<a href="/plays/2">x</a>"#);
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(sanitize("a<!-- hidden -->b", &INLINE), "ab");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "plain & simple",
            "<b>x</b><script>y</script>",
            "a < b > c",
            r#"<a href="http://x.com/?a=1&b=2" onclick="z">l</a>"#,
            "<i><b>nested</i></b>",
            "&nbsp;&amp;&lt;",
            "<foo>secret</foo>ok",
            "<x-widget><b>b</b></x-widget>tail",
            "<my-script>alert(1)</my-script><i>i</i>",
            "<b><unknown>x</b>y",
        ];
        for input in inputs {
            let once = sanitize(input, &INLINE);
            let twice = sanitize(&once, &INLINE);
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_allow_list_lookup() {
        assert!(INLINE.allows_tag("B"));
        assert!(!INLINE.allows_tag("script"));
        assert_eq!(INLINE.attributes("u"), &["class"]);
        assert!(INLINE.attributes("b").is_empty());
        assert!(INLINE.attributes("div").is_empty());
    }

    #[test]
    fn test_plain_text_strips_and_trims() {
        assert_eq!(plain_text("  <b>Hello</b> <i>World</i>  "), "Hello World");
    }

    #[test]
    fn test_plain_text_decodes_after_stripping() {
        assert_eq!(plain_text("&lt;b&gt;not bold&lt;/b&gt; &amp; more"), "<b>not bold</b> & more");
    }

    #[test]
    fn test_plain_text_drops_script_contents() {
        assert_eq!(plain_text("a<script>b</script>c"), "ac");
    }
}
