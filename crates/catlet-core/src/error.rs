//! # Identifier Errors
//!
//! Validation errors raised while parsing gene, geneset, architecture and
//! hash identifiers. Each variant carries the rejected input and the reason,
//! so that a malformed reference in a catlet configuration can be fixed
//! without guesswork.

use thiserror::Error;

/// Validation errors for the identifier newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Geneset identifier is not `organization/geneset[/tag]`.
    #[error("invalid gene set identifier \"{value}\": {reason}")]
    InvalidGeneSet {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Gene name contains invalid characters or is empty.
    #[error("invalid gene name \"{value}\": {reason}")]
    InvalidGeneName {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Gene reference is not `gene:organization/geneset[/tag]:name`.
    #[error("invalid gene reference \"{value}\": {reason}")]
    InvalidGeneReference {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Architecture is not `any`, `<hypervisor>` or `<hypervisor>/<processor>`.
    #[error("invalid architecture \"{value}\": {reason}")]
    InvalidArchitecture {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Gene hash is not `sha256:` followed by 64 lowercase hex characters.
    #[error("invalid gene hash \"{0}\" (expected sha256:<64 lowercase hex chars>)")]
    InvalidGeneHash(String),

    /// Gene type name is not one of `catlet`, `volume`, `fodder`.
    #[error("invalid gene type \"{0}\" (expected catlet, volume or fodder)")]
    InvalidGeneType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_gene_set_display() {
        let err = IdentifierError::InvalidGeneSet {
            value: "dbosoft".to_string(),
            reason: "missing gene set name".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("dbosoft"));
        assert!(msg.contains("missing gene set name"));
    }

    #[test]
    fn invalid_gene_hash_display() {
        let err = IdentifierError::InvalidGeneHash("md5:abc".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("md5:abc"));
        assert!(msg.contains("64 lowercase hex"));
    }

    #[test]
    fn invalid_gene_type_display() {
        let err = IdentifierError::InvalidGeneType("disk".to_string());
        assert!(format!("{err}").contains("disk"));
    }
}
