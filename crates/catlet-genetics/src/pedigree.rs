//! # Pedigree Resolution
//!
//! Walks the `parent` chain of a catlet configuration. For every ancestor
//! the parent geneset tag is resolved, the ancestor's catlet gene is read
//! from the pool, and every geneset reference inside the ancestor's
//! configuration is resolved and rewritten in turn.
//!
//! The walk is sequential and stops at the first failure: an ancestor can
//! only be located once its child has been read. Failures are wrapped with
//! the ancestor trace, e.g. `catlet -> dbosoft/utt/latest -> dbosoft/base/1.0`.

use std::fmt;

use catlet_core::{Architecture, CatletConfig, GeneIdentifier, GeneSetIdentifier};
use serde::Serialize;

use crate::error::{aggregate_all, GeneticsError, GeneticsResult, ResultExt};
use crate::genes::{select_variant, GeneListingCache, ResolvedGene};
use crate::geneset::GenesetResolver;
use crate::references::{apply_early_defaults, geneset_references, rewrite_references};

/// One step of a pedigree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AncestorInfo {
    /// The parent reference as written (normalized).
    pub reference: String,
    /// The geneset the reference resolved to.
    pub resolved: GeneSetIdentifier,
}

impl fmt::Display for AncestorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved = self.resolved.to_string();
        if resolved == self.reference {
            f.write_str(&self.reference)
        } else {
            write!(f, "{} [{}]", self.reference, resolved)
        }
    }
}

/// Render an ancestor trace: `catlet -> a -> b`.
pub fn render_trace(ancestors: &[AncestorInfo]) -> String {
    std::iter::once("catlet".to_string())
        .chain(ancestors.iter().map(ToString::to_string))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// An ancestor catlet with its references resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Ancestor {
    /// Where the ancestor sits in the pedigree.
    pub info: AncestorInfo,
    /// The ancestor's own configuration, references rewritten.
    pub config: CatletConfig,
    /// The catlet gene the configuration was read from.
    pub catlet_gene: ResolvedGene,
}

/// A configuration with its resolved ancestors, nearest parent first.
#[derive(Debug, Clone, PartialEq)]
pub struct Lineage {
    /// The input configuration, references rewritten.
    pub child: CatletConfig,
    /// Parent, grandparent, and so on.
    pub ancestors: Vec<Ancestor>,
}

impl Lineage {
    /// The pedigree, nearest parent first.
    pub fn pedigree(&self) -> Vec<AncestorInfo> {
        self.ancestors.iter().map(|a| a.info.clone()).collect()
    }
}

/// Resolve every geneset referenced by `config` and rewrite the references.
///
/// References are independent; all failures are reported together.
pub async fn resolve_config_references(
    config: &CatletConfig,
    resolver: &mut GenesetResolver<'_>,
) -> GeneticsResult<CatletConfig> {
    let mut steps = Vec::new();
    for gene_set in geneset_references(config)? {
        steps.push(resolver.resolve(&gene_set).await.map(drop));
    }
    aggregate_all(steps)?;
    rewrite_references(config, resolver.resolved())
}

fn parent_link(
    written: &CatletConfig,
    rewritten: &CatletConfig,
) -> GeneticsResult<Option<AncestorInfo>> {
    match (&written.parent, &rewritten.parent) {
        (Some(reference), Some(resolved)) => Ok(Some(AncestorInfo {
            reference: reference.clone(),
            resolved: GeneSetIdentifier::parse(resolved)?,
        })),
        _ => Ok(None),
    }
}

/// Read and parse the catlet gene of `gene_set`.
pub async fn load_catlet_gene(
    gene_set: &GeneSetIdentifier,
    cache: &mut GeneListingCache<'_>,
    architecture: &Architecture,
) -> GeneticsResult<(ResolvedGene, CatletConfig)> {
    let gene = GeneIdentifier::catlet(gene_set.clone());
    let variant = select_variant(&gene, cache.listing(gene_set).await?, architecture)?;
    let content = cache
        .reader()
        .get_gene_content(&variant.id, &variant.hash, cache.cancel())
        .await?;
    let config = serde_json::from_slice(&content).map_err(|source| GeneticsError::Deserialize {
        what: format!("the catlet gene of '{gene_set}'"),
        source,
    })?;
    Ok((variant, config))
}

/// Walk the pedigree of a configuration that went through
/// [`apply_early_defaults`].
///
/// # Errors
///
/// Reference failures in the configuration or any ancestor,
/// [`GeneticsError::CircularAncestry`] and [`GeneticsError::PedigreeTooLong`].
pub async fn resolve_pedigree(
    config: &CatletConfig,
    resolver: &mut GenesetResolver<'_>,
    cache: &mut GeneListingCache<'_>,
    architecture: &Architecture,
    max_depth: usize,
) -> GeneticsResult<Lineage> {
    let child = resolve_config_references(config, resolver)
        .await
        .with_context(|| "could not resolve genes in the catlet")?;

    let mut ancestors: Vec<Ancestor> = Vec::new();
    let mut pending = parent_link(config, &child)?;
    while let Some(info) = pending.take() {
        let mut infos: Vec<AncestorInfo> = ancestors.iter().map(|a| a.info.clone()).collect();
        let repeated = infos.iter().any(|a| a.resolved == info.resolved);
        infos.push(info.clone());
        let trace = render_trace(&infos);
        if repeated {
            return Err(GeneticsError::CircularAncestry { trace });
        }
        if ancestors.len() >= max_depth {
            return Err(GeneticsError::PedigreeTooLong {
                max: max_depth,
                trace,
            });
        }

        let context = || format!("could not resolve genes in the ancestor {trace}");
        let (catlet_gene, stored) = load_catlet_gene(&info.resolved, cache, architecture)
            .await
            .with_context(context)?;
        let prepared = apply_early_defaults(&stored).with_context(context)?;
        let rewritten = resolve_config_references(&prepared, resolver)
            .await
            .with_context(context)?;

        tracing::debug!(ancestor = %info, depth = ancestors.len() + 1, "resolved ancestor");
        pending = parent_link(&prepared, &rewritten)?;
        ancestors.push(Ancestor {
            info,
            config: rewritten,
            catlet_gene,
        });
    }

    Ok(Lineage { child, ancestors })
}
