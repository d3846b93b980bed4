//! # In-Memory Gene Pool
//!
//! [`MemoryGenePool`] holds manifests and gene bytes in memory. It is built
//! up front with the `with_*` methods and is read-only afterwards. Besides
//! serving tests and embedders that assemble genes on the fly, it counts
//! manifest lookups per geneset so callers can assert that resolution reads
//! each geneset at most once.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use catlet_core::{
    Architecture, GeneHash, GeneIdentifier, GeneName, GeneSetIdentifier, GeneType,
    UniqueGeneIdentifier,
};

use crate::error::{GenePoolError, GenePoolResult};
use crate::manifest::{GeneManifestEntry, GenesetTagManifest};
use crate::reader::{ensure_not_cancelled, GeneListing, GenePoolReader};

/// A gene pool held in memory.
#[derive(Debug, Default)]
pub struct MemoryGenePool {
    manifests: HashMap<GeneSetIdentifier, GenesetTagManifest>,
    contents: HashMap<GeneHash, Vec<u8>>,
    lookups: Mutex<HashMap<GeneSetIdentifier, usize>>,
}

impl MemoryGenePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    fn manifest_mut(&mut self, id: &GeneSetIdentifier) -> &mut GenesetTagManifest {
        self.manifests
            .entry(id.clone())
            .or_insert_with(|| GenesetTagManifest::new(id.clone()))
    }

    /// Make `from` an alias of `to`.
    pub fn with_reference(mut self, from: &GeneSetIdentifier, to: &GeneSetIdentifier) -> Self {
        self.manifest_mut(from).reference = Some(to.clone());
        self
    }

    /// Register a geneset tag with no genes and no redirect.
    pub fn with_geneset(mut self, id: &GeneSetIdentifier) -> Self {
        self.manifest_mut(id);
        self
    }

    /// Store the catlet gene of a geneset.
    pub fn with_catlet(mut self, id: &GeneSetIdentifier, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        let hash = GeneHash::compute(&content);
        self.manifest_mut(id).catlet = Some(hash.clone());
        self.contents.insert(hash, content);
        self
    }

    /// Store a fodder gene variant.
    pub fn with_fodder(
        mut self,
        id: &GeneSetIdentifier,
        name: &GeneName,
        architecture: &Architecture,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let content = content.into();
        let hash = GeneHash::compute(&content);
        self.manifest_mut(id).fodder.push(GeneManifestEntry {
            name: name.clone(),
            hash: hash.clone(),
            architecture: architecture.clone(),
        });
        self.contents.insert(hash, content);
        self
    }

    /// Store a volume gene variant. Only its hash is kept.
    pub fn with_volume(
        mut self,
        id: &GeneSetIdentifier,
        name: &GeneName,
        architecture: &Architecture,
        content: &[u8],
    ) -> Self {
        self.manifest_mut(id).volumes.push(GeneManifestEntry {
            name: name.clone(),
            hash: GeneHash::compute(content),
            architecture: architecture.clone(),
        });
        self
    }

    /// Number of manifest lookups served for a geneset.
    pub fn lookups(&self, id: &GeneSetIdentifier) -> usize {
        self.lookups.lock().get(id).copied().unwrap_or(0)
    }

    fn manifest(
        &self,
        id: &GeneSetIdentifier,
        cancel: &CancellationToken,
    ) -> GenePoolResult<&GenesetTagManifest> {
        ensure_not_cancelled(cancel)?;
        *self.lookups.lock().entry(id.clone()).or_insert(0) += 1;
        self.manifests
            .get(id)
            .ok_or_else(|| GenePoolError::GenesetNotFound(id.clone()))
    }
}

#[async_trait]
impl GenePoolReader for MemoryGenePool {
    async fn resolve_geneset_reference(
        &self,
        id: &GeneSetIdentifier,
        cancel: &CancellationToken,
    ) -> GenePoolResult<Option<GeneSetIdentifier>> {
        Ok(self.manifest(id, cancel)?.reference.clone())
    }

    async fn get_genes(
        &self,
        id: &GeneSetIdentifier,
        cancel: &CancellationToken,
    ) -> GenePoolResult<GeneListing> {
        Ok(self.manifest(id, cancel)?.genes())
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
        self.contents
            .get(hash)
            .cloned()
            .ok_or_else(|| GenePoolError::GeneNotFound(gene.clone()))
    }
}

/// Shorthand used by tests across the workspace: the unique identifier of
/// a gene variant.
pub fn unique_gene(
    gene_type: GeneType,
    gene_set: &GeneSetIdentifier,
    name: &GeneName,
    architecture: &Architecture,
) -> UniqueGeneIdentifier {
    UniqueGeneIdentifier::new(
        GeneIdentifier::new(gene_type, gene_set.clone(), name.clone()),
        architecture.clone(),
    )
}
