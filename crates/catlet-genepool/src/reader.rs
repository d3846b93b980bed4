//! # Gene Pool Reader
//!
//! The read-only boundary between the resolution pipeline and the pool.
//! Every call is asynchronous and takes a [`CancellationToken`]; readers
//! check the token before doing I/O and fail with
//! [`GenePoolError::Cancelled`] once it is cancelled.
//!
//! Implementations must be `Send + Sync` so a single reader can serve
//! concurrent builds behind an `Arc`. The trait is object-safe; the
//! pipeline takes `&dyn GenePoolReader`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use catlet_core::{GeneHash, GeneSetIdentifier, UniqueGeneIdentifier};

use crate::error::{GenePoolError, GenePoolResult};

/// Every gene variant of a geneset with its content hash.
pub type GeneListing = BTreeMap<UniqueGeneIdentifier, GeneHash>;

/// Read access to a gene pool.
#[async_trait]
pub trait GenePoolReader: Send + Sync {
    /// Return the redirect target of a geneset tag, or `None` when the tag
    /// is concrete.
    ///
    /// Fails with [`GenePoolError::GenesetNotFound`] when the tag is not in
    /// the pool.
    async fn resolve_geneset_reference(
        &self,
        id: &GeneSetIdentifier,
        cancel: &CancellationToken,
    ) -> GenePoolResult<Option<GeneSetIdentifier>>;

    /// List every gene variant of a concrete geneset tag.
    async fn get_genes(
        &self,
        id: &GeneSetIdentifier,
        cancel: &CancellationToken,
    ) -> GenePoolResult<GeneListing>;

    /// Read the bytes of a catlet or fodder gene.
    ///
    /// Fails with [`GenePoolError::VolumeContent`] for volume genes.
    async fn get_gene_content(
        &self,
        gene: &UniqueGeneIdentifier,
        hash: &GeneHash,
        cancel: &CancellationToken,
    ) -> GenePoolResult<Vec<u8>>;
}

/// Fail with [`GenePoolError::Cancelled`] if the token has been cancelled.
pub fn ensure_not_cancelled(cancel: &CancellationToken) -> GenePoolResult<()> {
    if cancel.is_cancelled() {
        Err(GenePoolError::Cancelled)
    } else {
        Ok(())
    }
}
