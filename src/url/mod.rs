//! Address handling module for Skein
//!
//! This module provides the pure functions the crawler builds its frontier on:
//! canonicalization of raw link text, structural depth, domain extraction,
//! and the content digest used as each record's identity.

mod canonical;
mod depth;
mod digest;

// Re-export main functions
pub use canonical::{canonicalize, is_address_char};
pub use depth::{depth, domain_and_tld};
pub use digest::AddressDigest;

/// Length of the leading region of an address (`https://`) in which doubled
/// separators are structural and left untouched
pub const SCHEME_REGION: usize = 8;

/// Strips the `http://`/`https://` scheme and an optional `www.` host label
pub(crate) fn strip_scheme(address: &str) -> &str {
    let rest = address
        .strip_prefix("https://")
        .or_else(|| address.strip_prefix("http://"))
        .unwrap_or(address);
    rest.strip_prefix("www.").unwrap_or(rest)
}
