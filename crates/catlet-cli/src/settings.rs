//! # CLI Settings
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults.
//! 2. An optional YAML settings file (`--settings <file>`).
//! 3. Environment variables.
//! 4. Command-line flags.
//!
//! ## Environment
//!
//! - `CATLET_GENEPOOL_PATH`: gene pool directory (default: `genepool`)
//! - `CATLET_ARCHITECTURE`: target architecture (default: `hyperv/amd64`)
//! - `CATLET_MAX_REFERENCE_DEPTH`: geneset reference chain bound (default: 5)
//! - `CATLET_MAX_PEDIGREE_DEPTH`: ancestor bound (default: 5)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use catlet_core::Architecture;
use catlet_genetics::options::{DEFAULT_MAX_PEDIGREE_DEPTH, DEFAULT_MAX_REFERENCE_DEPTH};
use catlet_genetics::GeneticsOptions;

pub const ENV_GENEPOOL_PATH: &str = "CATLET_GENEPOOL_PATH";
pub const ENV_ARCHITECTURE: &str = "CATLET_ARCHITECTURE";
pub const ENV_MAX_REFERENCE_DEPTH: &str = "CATLET_MAX_REFERENCE_DEPTH";
pub const ENV_MAX_PEDIGREE_DEPTH: &str = "CATLET_MAX_PEDIGREE_DEPTH";

/// Effective settings of one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Root directory of the local gene pool.
    pub genepool_path: PathBuf,
    /// Architecture genes are selected for.
    pub architecture: Architecture,
    /// Maximum length of a geneset reference chain.
    pub max_reference_depth: usize,
    /// Maximum number of ancestors.
    pub max_pedigree_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            genepool_path: PathBuf::from("genepool"),
            architecture: Architecture::hyperv_amd64(),
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
            max_pedigree_depth: DEFAULT_MAX_PEDIGREE_DEPTH,
        }
    }
}

/// Values given on the command line. `None` leaves the lower layer alone.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub genepool_path: Option<PathBuf>,
    pub architecture: Option<Architecture>,
    pub max_reference_depth: Option<usize>,
    pub max_pedigree_depth: Option<usize>,
}

impl Settings {
    /// Resolve all layers from the process environment.
    pub fn load(file: Option<&Path>, overrides: &SettingsOverrides) -> Result<Self> {
        let mut settings = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.apply_overrides(overrides);
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }

    /// Read a YAML settings file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid settings file {}", path.display()))
    }

    /// Apply environment variables, looked up through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = lookup(ENV_GENEPOOL_PATH) {
            self.genepool_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(ENV_ARCHITECTURE) {
            self.architecture = Architecture::parse(&value)
                .with_context(|| format!("invalid {ENV_ARCHITECTURE}"))?;
        }
        if let Some(value) = lookup(ENV_MAX_REFERENCE_DEPTH) {
            self.max_reference_depth = parse_depth(ENV_MAX_REFERENCE_DEPTH, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_PEDIGREE_DEPTH) {
            self.max_pedigree_depth = parse_depth(ENV_MAX_PEDIGREE_DEPTH, &value)?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(path) = &overrides.genepool_path {
            self.genepool_path = path.clone();
        }
        if let Some(architecture) = &overrides.architecture {
            self.architecture = architecture.clone();
        }
        if let Some(depth) = overrides.max_reference_depth {
            self.max_reference_depth = depth;
        }
        if let Some(depth) = overrides.max_pedigree_depth {
            self.max_pedigree_depth = depth;
        }
    }

    /// Pipeline options for these settings.
    pub fn genetics_options(&self) -> GeneticsOptions {
        GeneticsOptions {
            architecture: self.architecture.clone(),
            max_reference_depth: self.max_reference_depth,
            max_pedigree_depth: self.max_pedigree_depth,
        }
    }
}

fn parse_depth(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid {key}: expected a non-negative integer, got '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_pipeline_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.genetics_options(), GeneticsOptions::default());
        assert_eq!(settings.genepool_path, PathBuf::from("genepool"));
    }

    #[test]
    fn file_layer_keeps_unset_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "genepool_path: /var/pool\narchitecture: hyperv\n").unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.genepool_path, PathBuf::from("/var/pool"));
        assert_eq!(settings.architecture.to_string(), "hyperv/any");
        assert_eq!(settings.max_reference_depth, DEFAULT_MAX_REFERENCE_DEPTH);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "genepool: /var/pool\n").unwrap();
        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn env_overrides_file_and_flags_override_env() {
        let mut settings = Settings::default();
        settings
            .apply_env(env(&[
                (ENV_GENEPOOL_PATH, "/env/pool"),
                (ENV_ARCHITECTURE, "hyperv/arm64"),
                (ENV_MAX_PEDIGREE_DEPTH, "9"),
            ]))
            .unwrap();
        assert_eq!(settings.genepool_path, PathBuf::from("/env/pool"));
        assert_eq!(settings.max_pedigree_depth, 9);

        settings.apply_overrides(&SettingsOverrides {
            architecture: Some(Architecture::any()),
            ..Default::default()
        });
        assert!(settings.architecture.is_any());
        assert_eq!(settings.genepool_path, PathBuf::from("/env/pool"));
    }

    #[test]
    fn invalid_env_values_fail() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(env(&[(ENV_MAX_REFERENCE_DEPTH, "deep")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains(ENV_MAX_REFERENCE_DEPTH));
        assert!(settings
            .apply_env(env(&[(ENV_ARCHITECTURE, "a/b/c")]))
            .is_err());
    }
}
