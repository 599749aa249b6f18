//! Digest algorithms and content hashes for include files.

use serde::{Deserialize, Serialize};
use sha2::Digest;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a hash algorithm identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// The identifier does not name a supported digest.
    #[error("Unknown hash algorithm: '{0}'")]
    UnknownAlgorithm(String),
}

/// Digest algorithms usable for hash-addressed include files.
///
/// The identifier (`sha1`, `sha256`, ...) doubles as the key of provider
/// entries in the root document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-1, the historical default for include files.
    #[default]
    Sha1,
    /// SHA-256, used for provider files.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl HashAlgorithm {
    /// The lowercase identifier of this algorithm.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Hash `data` and return the lowercase hex digest.
    pub fn digest(self, data: &[u8]) -> ContentHash {
        let hex = match self {
            Self::Sha1 => hex::encode(sha1::Sha1::digest(data)),
            Self::Sha256 => hex::encode(sha2::Sha256::digest(data)),
            Self::Sha384 => hex::encode(sha2::Sha384::digest(data)),
            Self::Sha512 => hex::encode(sha2::Sha512::digest(data)),
        };
        ContentHash(hex)
    }
}

impl FromStr for HashAlgorithm {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(HashError::UnknownAlgorithm(s.to_string())),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase hex digest of an include file's serialized content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Create a new `ContentHash` without validation.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Return the inner hex string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
