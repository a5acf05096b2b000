//! Link extraction from raw page bodies
//!
//! Pages are scanned for `<a ... href="...">` patterns directly on the
//! response bytes. There is no DOM; malformed markup simply yields fewer
//! matches.

use crate::url::canonicalize;
use regex::bytes::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    // href must start an attribute, so data-href and the like are skipped
    Regex::new(r#"(?i)<a\s(?:[^>]*?\s)?href\s*=\s*"([^"]*)""#).expect("anchor pattern compiles")
});

/// Extracts unique canonical link targets from a page body
///
/// Each matched href is canonicalized against `origin`; rejected and
/// self-referential links are dropped. Duplicates are removed while the
/// first-seen order is kept.
///
/// # Example
///
/// ```
/// use skein::crawler::extract_links;
///
/// let body = br#"<a href="/about">About</a> <a href="/about">Again</a>"#;
/// let links = extract_links(body, "http://example.com", true);
/// assert_eq!(links, vec!["http://example.com/about".to_string()]);
/// ```
pub fn extract_links(body: &[u8], origin: &str, strip_query: bool) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for captures in ANCHOR_HREF.captures_iter(body) {
        let Some(raw) = captures.get(1) else {
            continue;
        };

        // Non-UTF-8 hrefs cannot pass the address character class anyway
        let Ok(raw) = std::str::from_utf8(raw.as_bytes()) else {
            continue;
        };

        match canonicalize(raw, origin, strip_query) {
            Some(address) => {
                if seen.insert(address.clone()) {
                    links.push(address);
                }
            }
            None => tracing::trace!("dropped link '{}' on {}", raw, origin),
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "http://example.com";

    #[test]
    fn test_relative_duplicate_self_and_fragment() {
        let body = br#"
            <a href="/a">one</a>
            <a href="/a">two</a>
            <a href="http://example.com">home</a>
            <a href="http://other.com/x#frag">away</a>
        "#;

        assert_eq!(
            extract_links(body, ORIGIN, true),
            vec![
                "http://example.com/a".to_string(),
                "http://other.com/x".to_string()
            ]
        );
    }

    #[test]
    fn test_preserves_first_seen_order() {
        let body = br#"<a href="/c"></a><a href="/b"></a><a href="/c"></a><a href="/a"></a>"#;

        assert_eq!(
            extract_links(body, ORIGIN, true),
            vec![
                "http://example.com/c".to_string(),
                "http://example.com/b".to_string(),
                "http://example.com/a".to_string(),
            ]
        );
    }

    #[test]
    fn test_attributes_and_case() {
        let body = br#"<A class="nav" HREF = "/docs/">Docs</A>"#;
        assert_eq!(
            extract_links(body, ORIGIN, true),
            vec!["http://example.com/docs".to_string()]
        );
    }

    #[test]
    fn test_href_suffixed_attributes_skipped() {
        let body = br#"<a data-href="/tracking" href="/real">x</a> <a xhref="/no">y</a>"#;
        assert_eq!(
            extract_links(body, ORIGIN, true),
            vec!["http://example.com/real".to_string()]
        );
    }

    #[test]
    fn test_href_after_line_break() {
        let body = b"<a\n  class=\"x\"\n  href=\"/multi\">m</a>";
        assert_eq!(
            extract_links(body, ORIGIN, true),
            vec!["http://example.com/multi".to_string()]
        );
    }

    #[test]
    fn test_query_handling() {
        let body = br#"<a href="/search?q=rust">s</a>"#;

        assert_eq!(
            extract_links(body, ORIGIN, true),
            vec!["http://example.com/search".to_string()]
        );
        assert_eq!(
            extract_links(body, ORIGIN, false),
            vec!["http://example.com/search?q=rust".to_string()]
        );
    }

    #[test]
    fn test_drops_unusable_links() {
        let body = br##"
            <a href="mailto:someone@example.com">mail</a>
            <a href="javascript:void(0)">js</a>
            <a href="#top">top</a>
            <a href="relative/path">rel</a>
            <a href="/has space">bad</a>
            <a href="">empty</a>
        "##;

        assert!(extract_links(body, ORIGIN, true).is_empty());
    }

    #[test]
    fn test_ignores_non_anchor_tags() {
        let body = br#"<link href="/style.css"><img src="/a.png"><area href="/map">"#;
        assert!(extract_links(body, ORIGIN, true).is_empty());
    }

    #[test]
    fn test_non_utf8_body() {
        let mut body = b"<a href=\"/ok\">ok</a>".to_vec();
        body.extend_from_slice(&[0xff, 0xfe]);
        body.extend_from_slice(b"<a href=\"/\xff\">bad</a>");

        assert_eq!(
            extract_links(&body, ORIGIN, true),
            vec!["http://example.com/ok".to_string()]
        );
    }
}
