//! # Gene References in a Configuration
//!
//! A configuration refers to the gene pool in three places: the `parent`
//! geneset, drive sources of the form `gene:<geneset>:<volume>`, and fodder
//! sources `gene:<geneset>:<fodder>`. This module normalizes those
//! references, collects the genesets they name, and rewrites them once the
//! geneset tags have been resolved.

use std::collections::{BTreeSet, HashMap};

use catlet_core::traverse::sequence;
use catlet_core::{
    format_gene_reference, is_gene_reference, parse_gene_reference, CatletConfig,
    GeneSetIdentifier,
};
use catlet_variables::fodder_path;

use crate::error::{aggregate_all, GeneticsError, GeneticsResult, ResultExt};

fn canonical_gene_reference(reference: &str) -> GeneticsResult<String> {
    let (gene_set, name) = parse_gene_reference(reference)?;
    Ok(format_gene_reference(&gene_set, &name))
}

/// Normalize every gene reference of `config` to its canonical lower-case
/// form with an explicit tag (`latest` when omitted).
///
/// Drive sources that are not gene references are local paths and are kept
/// as written. Fodder sources must be gene references.
///
/// # Errors
///
/// Every malformed reference, each with its location.
pub fn apply_early_defaults(config: &CatletConfig) -> GeneticsResult<CatletConfig> {
    let mut result = config.clone();
    let parent = result.parent.iter_mut().map(|parent| -> GeneticsResult<()> {
        let id = GeneSetIdentifier::parse(parent.as_str()).with_context(|| "invalid reference at Parent")?;
        *parent = id.to_string();
        Ok(())
    });
    let drives = result.drives.iter_mut().map(|drive| -> GeneticsResult<()> {
        let Some(source) = drive.source.as_deref().filter(|s| is_gene_reference(s)) else {
            return Ok(());
        };
        let canonical = canonical_gene_reference(source)
            .with_context(|| format!("invalid reference at Drives[Name={}].Source", drive.name))?;
        drive.source = Some(canonical);
        Ok(())
    });
    let fodder = result.fodder.iter_mut().enumerate().map(|(index, fodder)| -> GeneticsResult<()> {
        let Some(source) = fodder.source.as_deref() else {
            return Ok(());
        };
        let canonical = canonical_gene_reference(source)
            .with_context(|| format!("invalid reference at {}.Source", fodder_path(index, fodder)))?;
        fodder.source = Some(canonical);
        Ok(())
    });
    aggregate_all(parent.chain(drives).chain(fodder))?;
    Ok(result)
}

/// Every geneset `config` refers to, in a stable order.
///
/// Expects a configuration that went through [`apply_early_defaults`].
pub fn geneset_references(config: &CatletConfig) -> GeneticsResult<BTreeSet<GeneSetIdentifier>> {
    let parent = config
        .parent
        .iter()
        .map(|parent| GeneSetIdentifier::parse(parent).map_err(GeneticsError::from));
    let drive_sources = config.drives.iter().filter_map(|d| d.source.as_deref());
    let fodder_sources = config.fodder.iter().filter_map(|f| f.source.as_deref());
    let sources = drive_sources
        .chain(fodder_sources)
        .filter(|source| is_gene_reference(source))
        .map(|source| -> GeneticsResult<GeneSetIdentifier> {
            Ok(parse_gene_reference(source)?.0)
        });
    Ok(sequence(parent.chain(sources))?.into_iter().collect())
}

fn lookup<'a>(
    resolved: &'a HashMap<GeneSetIdentifier, GeneSetIdentifier>,
    id: &GeneSetIdentifier,
) -> GeneticsResult<&'a GeneSetIdentifier> {
    resolved.get(id).ok_or_else(|| {
        GeneticsError::Internal(format!("the gene set '{id}' has not been resolved"))
    })
}

fn rewrite_gene_reference(
    source: &str,
    resolved: &HashMap<GeneSetIdentifier, GeneSetIdentifier>,
) -> GeneticsResult<String> {
    let (gene_set, name) = parse_gene_reference(source)?;
    Ok(format_gene_reference(lookup(resolved, &gene_set)?, &name))
}

/// Replace every geneset `config` refers to with its resolved geneset.
///
/// # Errors
///
/// [`GeneticsError::Internal`] if a referenced geneset is missing from
/// `resolved`.
pub fn rewrite_references(
    config: &CatletConfig,
    resolved: &HashMap<GeneSetIdentifier, GeneSetIdentifier>,
) -> GeneticsResult<CatletConfig> {
    let mut result = config.clone();
    if let Some(parent) = &config.parent {
        let id = GeneSetIdentifier::parse(parent)?;
        result.parent = Some(lookup(resolved, &id)?.to_string());
    }
    for drive in &mut result.drives {
        if let Some(source) = drive.source.as_deref().filter(|s| is_gene_reference(s)) {
            drive.source = Some(rewrite_gene_reference(source, resolved)?);
        }
    }
    for fodder in &mut result.fodder {
        if let Some(source) = &fodder.source {
            fodder.source = Some(rewrite_gene_reference(source, resolved)?);
        }
    }
    Ok(result)
}
