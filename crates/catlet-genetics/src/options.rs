//! Pipeline options.

use catlet_core::Architecture;

/// Default bound on the number of geneset tags visited while following
/// `ref` redirects, including the starting tag.
pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 5;

/// Default bound on the number of ancestors of a catlet.
pub const DEFAULT_MAX_PEDIGREE_DEPTH: usize = 5;

/// Options of a single build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneticsOptions {
    /// Architecture genes are selected for.
    pub architecture: Architecture,
    /// Maximum length of a geneset reference chain.
    pub max_reference_depth: usize,
    /// Maximum number of ancestors.
    pub max_pedigree_depth: usize,
}

impl Default for GeneticsOptions {
    fn default() -> Self {
        Self {
            architecture: Architecture::hyperv_amd64(),
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
            max_pedigree_depth: DEFAULT_MAX_PEDIGREE_DEPTH,
        }
    }
}

impl GeneticsOptions {
    /// Options targeting `architecture` with default bounds.
    pub fn for_architecture(architecture: Architecture) -> Self {
        Self {
            architecture,
            ..Self::default()
        }
    }
}
