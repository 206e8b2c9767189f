//! URL normalization and internal/external link classification.

use crate::error::InvalidUrl;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;
use url::Url;

/// Target window for links that leave the hosting application
pub const EXTERNAL_TARGET: &str = "_blank";

/// Base used only to check the structure of relative references
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// Prefix `http://` onto bare domains so they parse as absolute URLs.
///
/// Left unchanged: anything with a scheme (`mailto:x`, `https://x`),
/// path-absolute and protocol-relative references (`/plays/2`, `//cdn.x`)
/// and anchors (`#section`).
pub fn add_protocol(href: &str) -> Cow<'_, str> {
    static SCHEME_REGEX: OnceLock<Regex> = OnceLock::new();
    let scheme = SCHEME_REGEX.get_or_init(|| Regex::new(r"^\w+:(//)?").unwrap());

    if scheme.is_match(href) || href.starts_with('/') || href.starts_with('#') {
        Cow::Borrowed(href)
    } else {
        Cow::Owned(format!("http://{}", href))
    }
}

/// A structurally valid link: absolute http(s) or a relative reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    href: String,
    host: Option<String>,
}

impl ParsedUrl {
    /// The link exactly as authored (after protocol normalization)
    pub fn as_str(&self) -> &str {
        &self.href
    }

    /// Lowercased host, absent for path-only references
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn is_relative(&self) -> bool {
        self.host.is_none()
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href)
    }
}

/// Parse a candidate link. Failure is an ordinary value, never a panic.
pub fn parse_url(candidate: &str) -> Result<ParsedUrl, InvalidUrl> {
    if candidate.is_empty() {
        return Err(InvalidUrl::Empty);
    }
    check_characters(candidate)?;

    match Url::parse(candidate) {
        Ok(url) => {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(InvalidUrl::UnsupportedScheme {
                    scheme: url.scheme().to_string(),
                });
            }
            let host = url
                .host_str()
                .filter(|h| !h.is_empty())
                .ok_or_else(|| InvalidUrl::Malformed("missing host".to_string()))?;
            Ok(ParsedUrl {
                href: candidate.to_string(),
                host: Some(host.to_ascii_lowercase()),
            })
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(RELATIVE_BASE)?;
            let joined = base.join(candidate)?;
            let host = if candidate.starts_with("//") {
                joined.host_str().map(str::to_ascii_lowercase)
            } else {
                None
            };
            Ok(ParsedUrl {
                href: candidate.to_string(),
                host,
            })
        }
        Err(err) => Err(err.into()),
    }
}

/// Reject characters a URI may not contain and broken `%XX` escapes.
///
/// The `url` crate would silently percent-encode these, hiding malformed input.
fn check_characters(candidate: &str) -> Result<(), InvalidUrl> {
    let bytes = candidate.as_bytes();
    for (position, character) in candidate.char_indices() {
        let legal = character.is_ascii_alphanumeric()
            || "-._~:/?#[]@!$&'()*+,;=%".contains(character);
        if !legal {
            return Err(InvalidUrl::IllegalCharacter {
                character,
                position,
            });
        }
        if character == '%' {
            let escape = bytes.get(position + 1..position + 3);
            let valid = escape.map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(InvalidUrl::MalformedEscape { position });
            }
        }
    }
    Ok(())
}

/// Hostnames whose links stay inside the hosting application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAllowList {
    hosts: Vec<String>,
}

impl HostAllowList {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { hosts }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
    }

    /// Path-only links and links to a listed host are internal
    pub fn is_internal(&self, url: &ParsedUrl) -> bool {
        match url.host() {
            None => true,
            Some(host) => self.contains(host),
        }
    }

    /// `_blank` for external links, nothing for internal ones
    pub fn link_target(&self, url: &ParsedUrl) -> Option<&'static str> {
        if self.is_internal(url) {
            None
        } else {
            Some(EXTERNAL_TARGET)
        }
    }
}

/// Outcome of classifying a URL block's link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Invalid(InvalidUrl),
    Internal(ParsedUrl),
    External(ParsedUrl),
}

impl LinkState {
    /// Normalize, parse and classify a raw link in one step
    pub fn classify(raw: &str, hosts: &HostAllowList) -> Self {
        let normalized = add_protocol(raw);
        match parse_url(&normalized) {
            Err(err) => LinkState::Invalid(err),
            Ok(url) if hosts.is_internal(&url) => LinkState::Internal(url),
            Ok(url) => LinkState::External(url),
        }
    }

    pub fn url(&self) -> Option<&ParsedUrl> {
        match self {
            LinkState::Invalid(_) => None,
            LinkState::Internal(url) | LinkState::External(url) => Some(url),
        }
    }

    pub fn target(&self) -> Option<&'static str> {
        match self {
            LinkState::External(_) => Some(EXTERNAL_TARGET),
            _ => None,
        }
    }
}
