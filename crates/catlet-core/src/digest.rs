//! # Gene Hash — Content Address of a Gene
//!
//! A [`GeneHash`] is the SHA-256 digest of a gene's bytes, rendered as
//! `sha256:<64 lowercase hex>`. It is the lookup key into the pool and is
//! immutable once computed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::IdentifierError;

const SHA256_PREFIX: &str = "sha256:";

/// SHA-256 hex digest pattern: exactly 64 lowercase hex characters.
fn is_valid_sha256(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

/// Content hash of a gene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeneHash(String);

impl GeneHash {
    /// Compute the hash of raw gene bytes.
    pub fn compute(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        Self(hex)
    }

    /// Parse `sha256:<hex>`. A bare 64-character hex string is accepted too.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidGeneHash`] for anything else.
    pub fn parse(value: &str) -> Result<Self, IdentifierError> {
        let trimmed = value.trim();
        let hex = trimmed.strip_prefix(SHA256_PREFIX).unwrap_or(trimmed);
        let hex = hex.to_ascii_lowercase();
        if !is_valid_sha256(&hex) {
            return Err(IdentifierError::InvalidGeneHash(value.to_string()));
        }
        Ok(Self(hex))
    }

    /// The 64-character lowercase hex digest.
    pub fn hex(&self) -> &str {
        &self.0
    }

    /// Whether `data` hashes to this value.
    pub fn matches(&self, data: &[u8]) -> bool {
        Self::compute(data) == *self
    }
}

impl fmt::Display for GeneHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SHA256_PREFIX}{}", self.0)
    }
}

impl FromStr for GeneHash {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GeneHash {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GeneHash> for String {
    fn from(hash: GeneHash) -> Self {
        hash.to_string()
    }
}
