//! Gene pool error types.
//!
//! Lookup failures name the geneset or gene that was requested; file
//! failures carry the path so that a corrupted pool can be repaired.

use std::path::PathBuf;

use catlet_core::{GeneHash, GeneSetIdentifier, IdentifierError, UniqueGeneIdentifier};
use thiserror::Error;

/// Errors that can occur while reading the gene pool.
#[derive(Debug, Error)]
pub enum GenePoolError {
    /// The geneset has no manifest in the pool.
    #[error("the gene set '{0}' does not exist in the local genepool")]
    GenesetNotFound(GeneSetIdentifier),

    /// The gene is not present in the pool.
    #[error("the {0} does not exist in the local genepool")]
    GeneNotFound(UniqueGeneIdentifier),

    /// Volume genes are disk images and have no textual content.
    #[error("the {0} is a volume; volume content cannot be read")]
    VolumeContent(UniqueGeneIdentifier),

    /// Stored bytes do not hash to the expected value.
    #[error("hash mismatch for {gene}: expected {expected}, got {actual}")]
    HashMismatch {
        gene: UniqueGeneIdentifier,
        expected: GeneHash,
        actual: GeneHash,
    },

    /// A manifest is structurally valid JSON but semantically invalid.
    #[error("invalid manifest at {path}: {detail}")]
    InvalidManifest { path: PathBuf, detail: String },

    /// JSON parsing failed.
    #[error("failed to parse JSON at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// An identifier stored in the pool is malformed.
    #[error("invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),

    /// The operation was cancelled.
    #[error("the operation was cancelled")]
    Cancelled,

    /// I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type alias for gene pool operations.
pub type GenePoolResult<T> = Result<T, GenePoolError>;

#[cfg(test)]
mod tests {
    use super::*;
    use catlet_core::{Architecture, GeneIdentifier, GeneType};

    #[test]
    fn geneset_not_found_display() {
        let id = GeneSetIdentifier::parse("dbosoft/utt/1.0").unwrap();
        let msg = format!("{}", GenePoolError::GenesetNotFound(id));
        assert!(msg.contains("dbosoft/utt/1.0"));
        assert!(msg.contains("does not exist in the local genepool"));
    }

    #[test]
    fn gene_not_found_display() {
        let gene = UniqueGeneIdentifier::new(
            GeneIdentifier::parse(GeneType::Fodder, "gene:acme/tools/1.0:food").unwrap(),
            Architecture::any(),
        );
        let msg = format!("{}", GenePoolError::GeneNotFound(gene));
        assert!(msg.contains("fodder gene:acme/tools/1.0:food (any)"));
    }

    #[test]
    fn invalid_manifest_display() {
        let err = GenePoolError::InvalidManifest {
            path: PathBuf::from("/pool/a/b/c/geneset-tag.json"),
            detail: "geneset mismatch".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("geneset-tag.json"));
        assert!(msg.contains("geneset mismatch"));
    }
}
