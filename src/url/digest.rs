use sha2::{Digest, Sha256};
use std::fmt;

/// Content digest of a canonical address
///
/// The hex-encoded SHA-256 of the address bytes. It is the record's identity
/// key in the frontier store; claims are ordered by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressDigest(String);

impl AddressDigest {
    /// Computes the digest of a canonical address
    ///
    /// # Examples
    ///
    /// ```
    /// use skein::url::AddressDigest;
    ///
    /// let digest = AddressDigest::of("http://example.com/a");
    /// assert_eq!(digest, AddressDigest::of("http://example.com/a"));
    /// assert_eq!(digest.as_str().len(), 64);
    /// ```
    pub fn of(address: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(address.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps a digest previously read back from storage
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
