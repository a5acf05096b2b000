use crate::url::strip_scheme;
use regex::Regex;
use std::sync::LazyLock;

// Last two dot-delimited labels of a host, ignoring any port
static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9-]+)\.([A-Za-z0-9-]+)(?::[0-9]+)?$").expect("domain pattern compiles")
});

/// Host portion of an address whose scheme has already been stripped
fn host_part(base: &str) -> &str {
    base.split('/').next().unwrap_or(base)
}

/// Computes the structural depth of an address
///
/// The scheme, an optional `www.` label and one trailing `/` are stripped,
/// then every remaining `/` counts one level. When `count_domain_labels` is
/// set, each host label beyond the registrable pair adds one more level, so
/// `sub.example.com` sits one level below `example.com`.
///
/// # Examples
///
/// ```
/// use skein::url::depth;
///
/// assert_eq!(depth("http://example.com", false), 0);
/// assert_eq!(depth("http://example.com/a/b/", false), 2);
/// assert_eq!(depth("http://blog.example.com/a", true), 2);
/// ```
pub fn depth(address: &str, count_domain_labels: bool) -> u32 {
    let base = strip_scheme(address);
    let base = base.strip_suffix('/').unwrap_or(base);

    let mut depth = base.matches('/').count() as u32;
    if count_domain_labels {
        let labels = host_part(base).matches('.').count() as u32;
        depth += labels.saturating_sub(1);
    }
    depth
}

/// Extracts the registrable domain and top-level domain of an address
///
/// Returns `None` when the host has fewer than two labels.
///
/// # Examples
///
/// ```
/// use skein::url::domain_and_tld;
///
/// assert_eq!(
///     domain_and_tld("https://www.news.example.co/path"),
///     Some(("example.co".to_string(), "co".to_string()))
/// );
/// assert_eq!(domain_and_tld("http://localhost/"), None);
/// ```
pub fn domain_and_tld(address: &str) -> Option<(String, String)> {
    let host = host_part(strip_scheme(address)).to_lowercase();
    let captures = DOMAIN_PATTERN.captures(&host)?;
    let (name, tld) = (captures.get(1)?.as_str(), captures.get(2)?.as_str());
    Some((format!("{}.{}", name, tld), tld.to_string()))
}
