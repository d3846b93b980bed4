//! Collects the genes a bred configuration needs from the pool: volumes
//! from drive sources and fodder genes from fodder sources.

use std::collections::BTreeSet;

use catlet_core::{
    is_gene_reference, parse_gene_reference, CatletConfig, GeneIdentifier, GeneType,
};

use catlet_variables::fodder_path;

use crate::error::{aggregate_all, GeneticsResult, ResultExt};

/// Every gene referenced by `config`, in a stable order.
///
/// Fodder sourced from a catlet gene (`gene:<set>:catlet`) is inherited
/// content, not a fodder gene, and is skipped, as are removal markers.
///
/// # Errors
///
/// Every malformed reference, each with its location.
pub fn collect_genes(config: &CatletConfig) -> GeneticsResult<Vec<GeneIdentifier>> {
    let volumes = config.drives.iter().filter_map(|drive| {
        let source = drive.source.as_deref().filter(|s| is_gene_reference(s))?;
        let gene = parse_gene_reference(source)
            .map(|(gene_set, name)| Some(GeneIdentifier::new(GeneType::Volume, gene_set, name)))
            .with_context(|| format!("invalid reference at Drives[Name={}].Source", drive.name));
        Some(gene)
    });

    let fodder = config
        .fodder
        .iter()
        .enumerate()
        .filter(|(_, fodder)| !fodder.is_removal())
        .filter_map(|(index, fodder)| {
            let source = fodder.source.as_deref()?;
            let gene = parse_gene_reference(source)
                .map(|(gene_set, name)| {
                    (!name.is_catlet())
                        .then(|| GeneIdentifier::new(GeneType::Fodder, gene_set, name))
                })
                .with_context(|| {
                    format!("invalid reference at {}.Source", fodder_path(index, fodder))
                });
            Some(gene)
        });

    let genes: BTreeSet<GeneIdentifier> = aggregate_all(volumes.chain(fodder))?
        .into_iter()
        .flatten()
        .collect();
    Ok(genes.into_iter().collect())
}
