//! Content Hash Value Object
//!
//! SHA-256 digest of a rendered document. Used as the audit identity of
//! whatever was handed to the apply tool.

use std::fmt;

use sha2::{Digest, Sha256};

/// Content hash value object
///
/// Always stored with the `sha256:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Prefix for SHA-256 hashes
    pub const PREFIX: &'static str = "sha256:";

    /// Length of the abbreviated form used in identities
    pub const SHORT_LEN: usize = 12;

    /// Compute the SHA-256 of `content`
    pub fn from_content(content: &str) -> Self {
        let hash = Sha256::digest(content.as_bytes());
        Self(format!("{}{:x}", Self::PREFIX, hash))
    }

    /// Full hash string with prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex part without prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// `sha256:` plus the first twelve hex digits
    pub fn short(&self) -> String {
        format!("{}{}", Self::PREFIX, self.short_hex())
    }

    /// First twelve hex digits, safe to use in a file name
    pub fn short_hex(&self) -> &str {
        let hex = self.hex();
        &hex[..Self::SHORT_LEN.min(hex.len())]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
