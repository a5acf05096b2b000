use crate::url::SCHEME_REGION;

/// Punctuation accepted in raw link text alongside ASCII alphanumerics
const ADDRESS_PUNCTUATION: &str = "_.~!*'();:@&=+$,/?#%-";

/// Minimum number of significant characters a raw link must carry
const MIN_LINK_LEN: usize = 2;

/// Returns true if `c` belongs to the accepted address character class
pub fn is_address_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ADDRESS_PUNCTUATION.contains(c)
}

/// Canonicalizes raw link text found on the page at `origin`
///
/// # Canonicalization Steps
///
/// 1. Trim; reject text shorter than two characters or containing characters
///    outside the address class
/// 2. Resolve root-relative links (`/path`) by appending them to `origin`
/// 3. Cut the query string at the first `?` when `strip_query` is set
/// 4. Cut the fragment at the first `#`
/// 5. Collapse doubled `/` runs past the scheme region (`https://`)
/// 6. Drop one trailing `/`
/// 7. Reject anything that is not an absolute http(s) address with a host, or
///    that is the origin itself
///
/// Applying it to its own output yields the same address.
///
/// # Arguments
///
/// * `raw_href` - The link text as found in the page
/// * `origin` - The address of the page the link was found on
/// * `strip_query` - Whether query strings are dropped
///
/// # Returns
///
/// * `Some(String)` - The canonical address
/// * `None` - The link was rejected
///
/// # Examples
///
/// ```
/// use skein::url::canonicalize;
///
/// let address = canonicalize("/docs//intro/#usage", "http://example.com", true);
/// assert_eq!(address.as_deref(), Some("http://example.com/docs/intro"));
///
/// assert_eq!(canonicalize("http://example.com/", "http://example.com", true), None);
/// ```
pub fn canonicalize(raw_href: &str, origin: &str, strip_query: bool) -> Option<String> {
    let href = raw_href.trim();
    if href.len() < MIN_LINK_LEN || !href.chars().all(is_address_char) {
        return None;
    }

    let origin = origin.trim();
    let mut address = if href.starts_with('/') {
        format!("{}{}", origin, href)
    } else {
        href.to_string()
    };

    if strip_query {
        truncate_at(&mut address, '?');
    }
    truncate_at(&mut address, '#');

    let mut address = collapse_separators(&address);
    if address.ends_with('/') {
        address.pop();
    }

    if !is_absolute(&address) || address == origin {
        return None;
    }

    Some(address)
}

fn truncate_at(address: &mut String, marker: char) {
    if let Some(idx) = address.find(marker) {
        address.truncate(idx);
    }
}

/// Collapses every run of `/` into a single one, leaving the scheme region alone
fn collapse_separators(address: &str) -> String {
    let split = SCHEME_REGION.min(address.len());
    let (head, tail) = if address.is_char_boundary(split) {
        address.split_at(split)
    } else {
        ("", address)
    };

    let mut collapsed = String::with_capacity(address.len());
    collapsed.push_str(head);

    let mut prev_separator = false;
    for c in tail.chars() {
        if c == '/' && prev_separator {
            continue;
        }
        prev_separator = c == '/';
        collapsed.push(c);
    }

    collapsed
}

/// Absolute http(s) address with a host right after the scheme
fn is_absolute(address: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        address
            .strip_prefix(scheme)
            .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'))
    })
}
