//! # Feeding
//!
//! Expands fodder gene references into the concrete fragments stored in the
//! gene pool.
//!
//! 1. Fodder entries are split into removal markers and active entries.
//! 2. The markers become removal keys: a whole source, a named fragment of
//!    a source, or a named local fragment.
//! 3. Every active entry sourced from a fodder gene is expanded into the
//!    gene's fragments, optionally filtered to the entry's `name`. Each
//!    fragment's `source` is set to the gene reference.
//! 4. The entry's variables bind the gene's declared variables.
//! 5. Removals are applied.
//! 6. Fragments with the same (`name`, `source`) are merged left to right.
//!
//! Local fodder and fodder inherited from a catlet gene pass through as is.

use std::collections::HashSet;

use catlet_core::{
    parse_gene_reference, CatletConfig, FodderConfig, FodderGeneConfig, GeneIdentifier, GeneType,
    VariableConfig,
};
use catlet_genepool::GenePoolReader;
use catlet_variables::VariableError;
use tokio_util::sync::CancellationToken;

use crate::breeding::merge_fodder_list;
use crate::error::{aggregate_all, GeneticsError, GeneticsResult, ResultExt};
use crate::genes::ResolvedGenes;

#[derive(Debug, Default)]
struct Removals {
    sources: HashSet<String>,
    named: HashSet<(String, String)>,
    local: HashSet<String>,
}

impl Removals {
    fn from_markers<'a>(markers: impl IntoIterator<Item = &'a FodderConfig>) -> Self {
        let mut removals = Self::default();
        for marker in markers {
            match (&marker.name, &marker.source) {
                (None, Some(source)) => {
                    removals.sources.insert(source.clone());
                }
                (Some(name), Some(source)) => {
                    removals.named.insert((name.clone(), source.clone()));
                }
                (Some(name), None) => {
                    removals.local.insert(name.clone());
                }
                (None, None) => {}
            }
        }
        removals
    }

    fn removes_source(&self, source: &str) -> bool {
        self.sources.contains(source)
    }

    fn removes(&self, fodder: &FodderConfig) -> bool {
        match (&fodder.name, &fodder.source) {
            (_, Some(source)) if self.removes_source(source) => true,
            (Some(name), Some(source)) => self.named.contains(&(name.clone(), source.clone())),
            (Some(name), None) => self.local.contains(name),
            _ => false,
        }
    }
}

/// The fodder gene an active entry expands, if any.
fn fodder_gene(entry: &FodderConfig) -> GeneticsResult<Option<GeneIdentifier>> {
    let Some(source) = &entry.source else {
        return Ok(None);
    };
    let (gene_set, name) = parse_gene_reference(source)?;
    if name.is_catlet() {
        return Ok(None);
    }
    Ok(Some(GeneIdentifier::new(GeneType::Fodder, gene_set, name)))
}

/// Bind the consumer's `bindings` to the gene's declared `variables`.
fn bind_variables(
    variables: &[VariableConfig],
    bindings: &[VariableConfig],
) -> GeneticsResult<Vec<VariableConfig>> {
    aggregate_all(bindings.iter().map(|b| -> GeneticsResult<()> {
        if variables.iter().any(|v| v.name == b.name) {
            Ok(())
        } else {
            Err(VariableError::UnknownBinding { name: b.name.clone() }.into())
        }
    }))?;

    Ok(variables
        .iter()
        .map(|declared| {
            let Some(binding) = bindings.iter().find(|b| b.name == declared.name) else {
                return declared.clone();
            };
            let secret = declared.is_secret() || binding.is_secret();
            VariableConfig {
                value: binding.value.clone().or_else(|| declared.value.clone()),
                secret: secret.then_some(true).or(declared.secret),
                ..declared.clone()
            }
        })
        .collect())
}

async fn expand(
    entry: &FodderConfig,
    gene: &GeneIdentifier,
    resolved: &ResolvedGenes,
    reader: &dyn GenePoolReader,
    cancel: &CancellationToken,
) -> GeneticsResult<Vec<FodderConfig>> {
    let variant = resolved.get(gene).ok_or_else(|| {
        GeneticsError::Internal(format!("the gene '{gene}' has not been resolved"))
    })?;
    let content = reader
        .get_gene_content(&variant.id, &variant.hash, cancel)
        .await?;
    let stored: FodderGeneConfig =
        serde_json::from_slice(&content).map_err(|source| GeneticsError::Deserialize {
            what: format!("the {}", variant.id),
            source,
        })?;

    let selected: Vec<&FodderConfig> = match &entry.name {
        Some(name) => {
            let matching: Vec<_> = stored
                .fodder
                .iter()
                .filter(|f| f.name.as_ref() == Some(name))
                .collect();
            if matching.is_empty() {
                return Err(GeneticsError::FodderNotFound {
                    gene: gene.reference(),
                    name: name.clone(),
                });
            }
            matching
        }
        None => stored.fodder.iter().collect(),
    };

    let variables = bind_variables(&stored.variables, &entry.variables)?;
    let source = gene.reference();
    Ok(selected
        .into_iter()
        .map(|fragment| {
            let mut fed = fragment.clone();
            fed.source = Some(source.clone());
            let own: Vec<VariableConfig> = fed
                .variables
                .drain(..)
                .filter(|v| !variables.iter().any(|g| g.name == v.name))
                .collect();
            fed.variables = variables.iter().cloned().chain(own).collect();
            fed
        })
        .collect())
}

/// The items an active entry contributes: the fragments of its fodder gene,
/// or the entry itself when it names no gene or its source is removed.
async fn feed_entry(
    entry: &FodderConfig,
    removals: &Removals,
    resolved: &ResolvedGenes,
    reader: &dyn GenePoolReader,
    cancel: &CancellationToken,
) -> GeneticsResult<Vec<FodderConfig>> {
    let source = entry.source.as_deref().unwrap_or_default();
    let gene = match fodder_gene(entry)? {
        Some(gene) if !removals.removes_source(source) => gene,
        _ => return Ok(vec![entry.clone()]),
    };
    let fragments = expand(entry, &gene, resolved, reader, cancel)
        .await
        .with_context(|| format!("could not expand the fodder gene '{source}'"))?;
    tracing::debug!(gene = %gene, fragments = fragments.len(), "fed fodder gene");
    Ok(fragments)
}

/// Expand the fodder genes of a bred configuration.
///
/// `resolved` must hold a variant for every fodder gene the configuration
/// references.
///
/// # Errors
///
/// Every entry that could not be expanded, each wrapped with the gene
/// reference.
pub async fn feed(
    config: &CatletConfig,
    resolved: &ResolvedGenes,
    reader: &dyn GenePoolReader,
    cancel: &CancellationToken,
) -> GeneticsResult<CatletConfig> {
    let (markers, active): (Vec<&FodderConfig>, Vec<&FodderConfig>) =
        config.fodder.iter().partition(|f| f.is_removal());
    let removals = Removals::from_markers(markers);

    let mut steps = Vec::with_capacity(active.len());
    for entry in active {
        steps.push(feed_entry(entry, &removals, resolved, reader, cancel).await);
    }
    let expanded: Vec<FodderConfig> = aggregate_all(steps)?.into_iter().flatten().collect();

    let kept: Vec<&FodderConfig> = expanded.iter().filter(|f| !removals.removes(f)).collect();
    Ok(CatletConfig {
        fodder: merge_fodder_list(kept),
        ..config.clone()
    })
}
