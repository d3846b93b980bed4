//! # Build
//!
//! Runs the resolution pipeline end to end:
//!
//! ```text
//! config ─▶ early defaults ─▶ geneset references + pedigree ─▶ breeding
//!        ─▶ late defaults ─▶ gene collection ─▶ gene selection ─▶ feeding
//!        (─▶ bindings ─▶ substitution)
//! ```
//!
//! Geneset resolutions and gene listings are memoized for the duration of
//! one call. Nothing is shared between calls, so concurrent builds against
//! the same reader are independent.

use std::collections::BTreeMap;

use catlet_core::{CatletConfig, GeneHash, GeneIdentifier, UniqueGeneIdentifier};
use catlet_genepool::GenePoolReader;
use catlet_variables::{apply_bindings, substitute_variables};
use tokio_util::sync::CancellationToken;

use crate::breeding::breed;
use crate::collector::collect_genes;
use crate::defaults::apply_late_defaults;
use crate::error::{GeneticsResult, ResultExt};
use crate::feeding::feed;
use crate::genes::{resolve_genes, GeneListingCache, ResolvedGenes};
use crate::geneset::GenesetResolver;
use crate::options::GeneticsOptions;
use crate::pedigree::{resolve_pedigree, AncestorInfo, Lineage};
use crate::references::apply_early_defaults;

/// The outcome of a build.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCatlet {
    /// The self-contained configuration.
    pub config: CatletConfig,
    /// Every gene the configuration depends on, with the selected variant.
    /// Includes the catlet genes of all ancestors.
    pub genes: ResolvedGenes,
    /// The ancestors, nearest parent first.
    pub pedigree: Vec<AncestorInfo>,
}

impl ResolvedCatlet {
    /// Selected variants with their content hashes.
    pub fn gene_hashes(&self) -> BTreeMap<UniqueGeneIdentifier, GeneHash> {
        self.genes
            .values()
            .map(|g| (g.id.clone(), g.hash.clone()))
            .collect()
    }
}

/// Fold a lineage into one configuration, from the oldest ancestor down.
pub fn breed_lineage(lineage: &Lineage) -> GeneticsResult<CatletConfig> {
    let ancestors = &lineage.ancestors;
    let Some(root) = ancestors.last() else {
        return Ok(lineage.child.clone());
    };
    let mut bred = root.config.clone();
    for index in (0..ancestors.len()).rev() {
        let child = match index {
            0 => &lineage.child,
            _ => &ancestors[index - 1].config,
        };
        let parent_id = &ancestors[index].info.resolved;
        bred = breed(&bred, child, parent_id)
            .with_context(|| format!("could not breed with the parent '{parent_id}'"))?;
    }
    Ok(bred)
}

/// Resolve `config` into a self-contained configuration.
///
/// Placeholders are left in place; see [`build_and_substitute`].
///
/// # Errors
///
/// Any failure of a pipeline stage, wrapped with the stage's context.
pub async fn build(
    config: &CatletConfig,
    reader: &dyn GenePoolReader,
    options: &GeneticsOptions,
    cancel: &CancellationToken,
) -> GeneticsResult<ResolvedCatlet> {
    let prepared = apply_early_defaults(config)?;

    let mut resolver = GenesetResolver::new(reader, cancel, options.max_reference_depth);
    let mut cache = GeneListingCache::new(reader, cancel);
    let lineage = resolve_pedigree(
        &prepared,
        &mut resolver,
        &mut cache,
        &options.architecture,
        options.max_pedigree_depth,
    )
    .await?;

    let bred = apply_late_defaults(&breed_lineage(&lineage)?);
    let genes = collect_genes(&bred)?;
    let mut resolved = resolve_genes(&genes, &mut cache, &options.architecture).await?;
    for ancestor in &lineage.ancestors {
        resolved.insert(
            GeneIdentifier::catlet(ancestor.info.resolved.clone()),
            ancestor.catlet_gene.clone(),
        );
    }

    let fed = feed(&bred, &resolved, reader, cancel).await?;

    tracing::info!(
        architecture = %options.architecture,
        ancestors = lineage.ancestors.len(),
        genes = resolved.len(),
        fodder = fed.fodder.len(),
        "built catlet configuration"
    );
    Ok(ResolvedCatlet {
        config: fed,
        genes: resolved,
        pedigree: lineage.pedigree(),
    })
}

/// [`build`], then bind `bindings` to the catlet variables and substitute
/// every placeholder.
///
/// # Errors
///
/// Build failures, unknown bindings, and variable errors.
pub async fn build_and_substitute(
    config: &CatletConfig,
    bindings: &BTreeMap<String, String>,
    reader: &dyn GenePoolReader,
    options: &GeneticsOptions,
    cancel: &CancellationToken,
) -> GeneticsResult<ResolvedCatlet> {
    let built = build(config, reader, options, cancel).await?;
    let bound = apply_bindings(&built.config, bindings)?;
    let substituted = substitute_variables(&bound)?;
    Ok(ResolvedCatlet {
        config: substituted,
        ..built
    })
}
