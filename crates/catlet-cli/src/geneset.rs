//! `catlet resolve` and `catlet genes`: inspect geneset tags in the local pool.

use anyhow::{Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;

use catlet_core::GeneSetIdentifier;
use catlet_genepool::{GenePoolReader, LocalGenePool};
use catlet_genetics::geneset::GenesetResolver;

use crate::settings::Settings;

/// Arguments naming one geneset tag.
#[derive(Args, Debug)]
pub struct GenesetArgs {
    /// Geneset tag, e.g. `dbosoft/ubuntu-22.04/latest`. The tag defaults to `latest`.
    pub geneset: String,
}

impl GenesetArgs {
    fn identifier(&self) -> Result<GeneSetIdentifier> {
        GeneSetIdentifier::parse(&self.geneset)
            .with_context(|| format!("invalid geneset '{}'", self.geneset))
    }
}

/// The concrete tag `args.geneset` redirects to.
pub async fn resolve_geneset(
    args: &GenesetArgs,
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<GeneSetIdentifier> {
    let id = args.identifier()?;
    let pool = LocalGenePool::new(&settings.genepool_path);
    let mut resolver = GenesetResolver::new(&pool, cancel, settings.max_reference_depth);
    Ok(resolver.resolve(&id).await?)
}

/// One line per gene variant: `<gene> <hash>`.
pub async fn list_genes(
    args: &GenesetArgs,
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<Vec<String>> {
    let id = args.identifier()?;
    let pool = LocalGenePool::new(&settings.genepool_path);
    let listing = pool.get_genes(&id, cancel).await?;
    Ok(listing
        .iter()
        .map(|(gene, hash)| format!("{gene} {hash}"))
        .collect())
}

pub async fn run_resolve(
    args: &GenesetArgs,
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<u8> {
    let resolved = resolve_geneset(args, settings, cancel).await?;
    println!("{resolved}");
    Ok(0)
}

pub async fn run_genes(
    args: &GenesetArgs,
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<u8> {
    let lines = list_genes(args, settings, cancel).await?;
    if lines.is_empty() {
        tracing::warn!(geneset = %args.geneset, "geneset lists no genes");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(0)
}
