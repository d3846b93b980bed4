//! # Architecture-aware Gene Selection
//!
//! A gene reference names a gene, not a file: the geneset may hold several
//! variants of it built for different (hypervisor, processor) pairs. The
//! selection for a target architecture takes the first match of:
//!
//! 1. the exact architecture,
//! 2. the same hypervisor with any processor,
//! 3. any hypervisor with the same processor,
//! 4. any hypervisor and any processor.
//!
//! When none of those exists, the failure says why: the gene does not
//! exist at all, no variant supports the hypervisor, or none supports the
//! processor architecture.

use std::collections::{BTreeMap, HashMap};

use catlet_core::{Architecture, GeneHash, GeneIdentifier, GeneSetIdentifier, UniqueGeneIdentifier};
use catlet_genepool::{GeneListing, GenePoolReader};
use tokio_util::sync::CancellationToken;

use crate::error::{aggregate_all, GeneticsError, GeneticsResult, ResultExt};

/// The variant chosen for a gene reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGene {
    /// The concrete variant.
    pub id: UniqueGeneIdentifier,
    /// Hash of the variant's content.
    pub hash: GeneHash,
}

/// Selected variants keyed by the gene they were selected for.
pub type ResolvedGenes = BTreeMap<GeneIdentifier, ResolvedGene>;

/// Gene listings read during one build, one read per geneset.
pub struct GeneListingCache<'a> {
    reader: &'a dyn GenePoolReader,
    cancel: &'a CancellationToken,
    listings: HashMap<GeneSetIdentifier, GeneListing>,
}

impl<'a> GeneListingCache<'a> {
    /// Create an empty cache reading from `reader`.
    pub fn new(reader: &'a dyn GenePoolReader, cancel: &'a CancellationToken) -> Self {
        Self {
            reader,
            cancel,
            listings: HashMap::new(),
        }
    }

    /// The gene listing of `gene_set`.
    pub async fn listing(&mut self, gene_set: &GeneSetIdentifier) -> GeneticsResult<&GeneListing> {
        if !self.listings.contains_key(gene_set) {
            let listing = self.reader.get_genes(gene_set, self.cancel).await?;
            tracing::debug!(geneset = %gene_set, genes = listing.len(), "listed genes");
            self.listings.insert(gene_set.clone(), listing);
        }
        self.listings.get(gene_set).ok_or_else(|| {
            GeneticsError::Internal(format!("the gene listing of '{gene_set}' was not cached"))
        })
    }

    /// The reader behind the cache.
    pub fn reader(&self) -> &'a dyn GenePoolReader {
        self.reader
    }

    /// The cancellation token of the build.
    pub fn cancel(&self) -> &'a CancellationToken {
        self.cancel
    }
}

/// Select the variant of `gene` for `target` from the geneset listing.
///
/// # Errors
///
/// [`GeneticsError::GeneNotFound`], [`GeneticsError::IncompatibleHypervisor`]
/// or [`GeneticsError::IncompatibleProcessor`].
pub fn select_variant(
    gene: &GeneIdentifier,
    listing: &GeneListing,
    target: &Architecture,
) -> GeneticsResult<ResolvedGene> {
    let candidates: Vec<(&UniqueGeneIdentifier, &GeneHash)> =
        listing.iter().filter(|(unique, _)| unique.id == *gene).collect();
    if candidates.is_empty() {
        return Err(GeneticsError::GeneNotFound(gene.clone()));
    }

    let hypervisor_compatible: Vec<_> = candidates
        .into_iter()
        .filter(|(unique, _)| unique.architecture.hypervisor_matches(target))
        .collect();
    if hypervisor_compatible.is_empty() {
        return Err(GeneticsError::IncompatibleHypervisor {
            gene: gene.clone(),
            architecture: target.clone(),
        });
    }

    let compatible: Vec<_> = hypervisor_compatible
        .into_iter()
        .filter(|(unique, _)| unique.architecture.processor_matches(target))
        .collect();
    if compatible.is_empty() {
        return Err(GeneticsError::IncompatibleProcessor {
            gene: gene.clone(),
            architecture: target.clone(),
        });
    }

    let preferences = [
        target.clone(),
        target.with_any_processor(),
        target.with_any_hypervisor(),
        Architecture::any(),
    ];
    // A wildcard target is compatible with concrete variants that none of
    // the preferences name; the first one in listing order is taken then.
    let (id, hash) = preferences
        .iter()
        .find_map(|wanted| compatible.iter().find(|(u, _)| u.architecture == *wanted))
        .or_else(|| compatible.first())
        .ok_or_else(|| GeneticsError::Internal(format!("no compatible variant of '{gene}'")))?;
    Ok(ResolvedGene {
        id: (*id).clone(),
        hash: (*hash).clone(),
    })
}

/// Resolve every gene in `genes` for `target`.
///
/// Genes are independent: all failures are reported together.
pub async fn resolve_genes(
    genes: &[GeneIdentifier],
    cache: &mut GeneListingCache<'_>,
    target: &Architecture,
) -> GeneticsResult<ResolvedGenes> {
    let mut steps = Vec::with_capacity(genes.len());
    for gene in genes {
        let selected = match cache.listing(&gene.gene_set).await {
            Ok(listing) => select_variant(gene, listing, target),
            Err(e) => Err(e),
        };
        steps.push(
            selected
                .map(|variant| (gene.clone(), variant))
                .with_context(|| format!("could not resolve the gene '{gene}'")),
        );
    }
    let resolved = aggregate_all(steps)?;
    for (gene, variant) in &resolved {
        tracing::debug!(gene = %gene, variant = %variant.id, hash = %variant.hash, "resolved gene");
    }
    Ok(resolved.into_iter().collect())
}
