//! `catlet build`: resolve a catlet configuration against the local pool.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use catlet_core::{Architecture, CatletConfig};
use catlet_genepool::LocalGenePool;
use catlet_genetics::{build, build_and_substitute, AncestorInfo, ResolvedCatlet};

use crate::settings::Settings;

/// Arguments of `catlet build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Catlet configuration file (JSON, or YAML by `.yaml`/`.yml` extension).
    #[arg(long, short = 'c')]
    pub config: PathBuf,

    /// Target architecture, e.g. `hyperv/amd64`.
    #[arg(long, value_parser = parse_architecture)]
    pub arch: Option<Architecture>,

    /// Bind a catlet variable, as `name=value`. Repeatable.
    #[arg(long = "var", value_parser = parse_binding)]
    pub vars: Vec<(String, String)>,

    /// Leave `{{ name }}` placeholders unresolved.
    #[arg(long)]
    pub no_substitute: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

pub fn parse_architecture(value: &str) -> Result<Architecture, String> {
    Architecture::parse(value).map_err(|e| e.to_string())
}

/// Parse `name=value`. The value may itself contain `=`.
pub fn parse_binding(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, bound)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), bound.to_string()))
        }
        _ => Err(format!("expected name=value, got '{value}'")),
    }
}

#[derive(Serialize)]
struct BuildOutput<'a> {
    config: &'a CatletConfig,
    genes: BTreeMap<String, String>,
    pedigree: &'a [AncestorInfo],
}

/// Read a catlet configuration file.
pub fn read_config(path: &Path) -> Result<CatletConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let parsed = if yaml {
        serde_yaml::from_str(&text).map_err(anyhow::Error::from)
    } else {
        serde_json::from_str(&text).map_err(anyhow::Error::from)
    };
    parsed.with_context(|| format!("invalid catlet config {}", path.display()))
}

/// Render a build result in `format`.
pub fn render(resolved: &ResolvedCatlet, format: OutputFormat) -> Result<String> {
    let output = BuildOutput {
        config: &resolved.config,
        genes: resolved
            .gene_hashes()
            .into_iter()
            .map(|(gene, hash)| (gene.to_string(), hash.to_string()))
            .collect(),
        pedigree: &resolved.pedigree,
    };
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&output).context("failed to render build output")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&output).context("failed to render build output")
        }
    }
}

/// Resolve the configuration named by `args` and render the result.
pub async fn build_config(
    args: &BuildArgs,
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<String> {
    let config = read_config(&args.config)?;
    let pool = LocalGenePool::new(&settings.genepool_path);
    let mut options = settings.genetics_options();
    if let Some(arch) = &args.arch {
        options.architecture = arch.clone();
    }

    let resolved = if args.no_substitute {
        build(&config, &pool, &options, cancel).await
    } else {
        let bindings: BTreeMap<String, String> = args.vars.iter().cloned().collect();
        build_and_substitute(&config, &bindings, &pool, &options, cancel).await
    }
    .with_context(|| format!("failed to build {}", args.config.display()))?;

    render(&resolved, args.format)
}

pub async fn run_build(
    args: &BuildArgs,
    settings: &Settings,
    cancel: &CancellationToken,
) -> Result<u8> {
    let rendered = build_config(args, settings, cancel).await?;
    println!("{rendered}");
    Ok(0)
}
