//! # Geneset Tag Manifest
//!
//! Every geneset tag in the pool has a `geneset-tag.json` manifest. A tag
//! is either a redirect to another tag (`ref`), or it lists its genes with
//! their content hashes:
//!
//! ```json
//! {
//!   "geneset": "dbosoft/utt/1.0",
//!   "catlet": "sha256:…",
//!   "volumes": [{ "name": "sda", "hash": "sha256:…", "architecture": "hyperv/amd64" }],
//!   "fodder":  [{ "name": "food", "hash": "sha256:…" }]
//! }
//! ```
//!
//! A missing `architecture` means `any`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use catlet_core::{
    Architecture, GeneHash, GeneIdentifier, GeneName, GeneSetIdentifier, GeneType,
    UniqueGeneIdentifier,
};

use crate::error::{GenePoolError, GenePoolResult};
use crate::reader::GeneListing;

/// One gene variant listed in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneManifestEntry {
    /// Gene name.
    pub name: GeneName,
    /// Content hash.
    pub hash: GeneHash,
    /// Architecture variant.
    #[serde(default, skip_serializing_if = "Architecture::is_any")]
    pub architecture: Architecture,
}

/// Contents of `geneset-tag.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesetTagManifest {
    /// The geneset tag this manifest describes.
    pub geneset: GeneSetIdentifier,
    /// Redirect target when this tag is an alias.
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<GeneSetIdentifier>,
    /// Hash of the catlet gene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catlet: Option<GeneHash>,
    /// Volume gene variants.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<GeneManifestEntry>,
    /// Fodder gene variants.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fodder: Vec<GeneManifestEntry>,
}

impl GenesetTagManifest {
    /// An empty manifest for a geneset tag.
    pub fn new(geneset: GeneSetIdentifier) -> Self {
        Self {
            geneset,
            reference: None,
            catlet: None,
            volumes: Vec::new(),
            fodder: Vec::new(),
        }
    }

    /// Parse and validate manifest bytes read from `path`.
    pub fn from_slice(
        bytes: &[u8],
        expected: &GeneSetIdentifier,
        path: &Path,
    ) -> GenePoolResult<Self> {
        let manifest: Self =
            serde_json::from_slice(bytes).map_err(|source| GenePoolError::JsonParse {
                path: path.to_path_buf(),
                source,
            })?;
        manifest.validate(expected, path)?;
        Ok(manifest)
    }

    /// Check that the manifest describes `expected` and lists each gene
    /// variant once.
    pub fn validate(&self, expected: &GeneSetIdentifier, path: &Path) -> GenePoolResult<()> {
        let invalid = |detail: String| GenePoolError::InvalidManifest {
            path: path.to_path_buf(),
            detail,
        };
        if &self.geneset != expected {
            return Err(invalid(format!(
                "manifest describes '{}' but is stored as '{expected}'",
                self.geneset
            )));
        }
        let listed = self.volumes.len() + self.fodder.len() + usize::from(self.catlet.is_some());
        let genes = self.genes();
        if genes.len() != listed {
            return Err(invalid("a gene variant is listed more than once".to_string()));
        }
        Ok(())
    }

    /// All gene variants listed by the manifest with their hashes.
    pub fn genes(&self) -> GeneListing {
        let mut genes = BTreeMap::new();
        if let Some(hash) = &self.catlet {
            genes.insert(
                UniqueGeneIdentifier::new(
                    GeneIdentifier::catlet(self.geneset.clone()),
                    Architecture::any(),
                ),
                hash.clone(),
            );
        }
        let typed = self
            .volumes
            .iter()
            .map(|e| (GeneType::Volume, e))
            .chain(self.fodder.iter().map(|e| (GeneType::Fodder, e)));
        for (gene_type, entry) in typed {
            genes.insert(
                UniqueGeneIdentifier::new(
                    GeneIdentifier::new(gene_type, self.geneset.clone(), entry.name.clone()),
                    entry.architecture.clone(),
                ),
                entry.hash.clone(),
            );
        }
        genes
    }
}
