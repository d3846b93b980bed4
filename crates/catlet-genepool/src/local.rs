//! # Filesystem Gene Pool
//!
//! [`LocalGenePool`] reads a pool directory laid out as described in
//! [`crate::addressing`]. Gene listings come from the tag manifest; gene
//! content is read from the addressed file and its SHA-256 is checked
//! against the manifest hash before it is returned.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use catlet_core::{GeneHash, GeneSetIdentifier, GeneType, UniqueGeneIdentifier};

use crate::addressing;
use crate::error::{GenePoolError, GenePoolResult};
use crate::manifest::GenesetTagManifest;
use crate::reader::{ensure_not_cancelled, GeneListing, GenePoolReader};

/// A gene pool backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalGenePool {
    root: PathBuf,
}

impl LocalGenePool {
    /// Create a reader for the pool rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The pool root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read and validate the manifest of a geneset tag.
    pub async fn read_manifest(
        &self,
        id: &GeneSetIdentifier,
        cancel: &CancellationToken,
    ) -> GenePoolResult<GenesetTagManifest> {
        ensure_not_cancelled(cancel)?;
        let path = addressing::manifest_path(&self.root, id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GenePoolError::GenesetNotFound(id.clone()))
            }
            Err(source) => return Err(GenePoolError::Io { path, source }),
        };
        tracing::trace!(path = %path.display(), "read geneset manifest");
        GenesetTagManifest::from_slice(&bytes, id, &path)
    }
}

#[async_trait]
impl GenePoolReader for LocalGenePool {
    async fn resolve_geneset_reference(
        &self,
        id: &GeneSetIdentifier,
        cancel: &CancellationToken,
    ) -> GenePoolResult<Option<GeneSetIdentifier>> {
        Ok(self.read_manifest(id, cancel).await?.reference)
    }

    async fn get_genes(
        &self,
        id: &GeneSetIdentifier,
        cancel: &CancellationToken,
    ) -> GenePoolResult<GeneListing> {
        Ok(self.read_manifest(id, cancel).await?.genes())
    }

    async fn get_gene_content(
        &self,
        gene: &UniqueGeneIdentifier,
        hash: &GeneHash,
        cancel: &CancellationToken,
    ) -> GenePoolResult<Vec<u8>> {
        if gene.gene_type() == GeneType::Volume {
            return Err(GenePoolError::VolumeContent(gene.clone()));
        }
        ensure_not_cancelled(cancel)?;
        let path = addressing::gene_path(&self.root, gene);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GenePoolError::GeneNotFound(gene.clone()))
            }
            Err(source) => return Err(GenePoolError::Io { path, source }),
        };
        let actual = GeneHash::compute(&bytes);
        if &actual != hash {
            tracing::warn!(
                gene = %gene,
                path = %path.display(),
                expected = %hash,
                actual = %actual,
                "gene content does not match its hash"
            );
            return Err(GenePoolError::HashMismatch {
                gene: gene.clone(),
                expected: hash.clone(),
                actual,
            });
        }
        Ok(bytes)
    }
}
