//! # catlet CLI Entry Point
//!
//! Parses command-line arguments with clap derive, initializes tracing,
//! loads layered settings and dispatches to the subcommand handler on a
//! tokio runtime. Ctrl-C cancels the running command.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use catlet_cli::build::{parse_architecture, run_build, BuildArgs};
use catlet_cli::geneset::{run_genes, run_resolve, GenesetArgs};
use catlet_cli::hash::{run_hash, HashArgs};
use catlet_cli::settings::{Settings, SettingsOverrides};
use catlet_core::Architecture;

/// Catlet genetics: resolve catlet configurations against a local gene pool.
#[derive(Parser, Debug)]
#[command(name = "catlet", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv). Without it, RUST_LOG applies.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// YAML settings file.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Gene pool directory.
    #[arg(long, global = true)]
    genepool: Option<PathBuf>,

    /// Default target architecture.
    #[arg(long, global = true, value_parser = parse_architecture)]
    architecture: Option<Architecture>,

    /// Maximum length of a geneset reference chain.
    #[arg(long, global = true)]
    max_reference_depth: Option<usize>,

    /// Maximum number of ancestors.
    #[arg(long, global = true)]
    max_pedigree_depth: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a catlet configuration.
    Build(BuildArgs),
    /// Print the concrete geneset a tag redirects to.
    Resolve(GenesetArgs),
    /// List the gene variants of a geneset tag.
    Genes(GenesetArgs),
    /// Print the gene hash of a file.
    Hash(HashArgs),
}

impl Cli {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            genepool_path: self.genepool.clone(),
            architecture: self.architecture.clone(),
            max_reference_depth: self.max_reference_depth,
            max_pedigree_depth: self.max_pedigree_depth,
        }
    }
}

fn env_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

async fn run(cli: &Cli, cancel: &CancellationToken) -> anyhow::Result<u8> {
    let settings = Settings::load(cli.settings.as_deref(), &cli.overrides())?;
    match &cli.command {
        Commands::Build(args) => run_build(args, &settings, cancel).await,
        Commands::Resolve(args) => run_resolve(args, &settings, cancel).await,
        Commands::Genes(args) => run_genes(args, &settings, cancel).await,
        Commands::Hash(args) => run_hash(args).await,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("failed to start the async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let cancel = CancellationToken::new();
    let result = runtime.block_on(async {
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling");
                on_interrupt.cancel();
            }
        });
        run(&cli, &cancel).await
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
