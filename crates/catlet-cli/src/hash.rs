//! `catlet hash`: print the gene hash of a file, as written to manifests.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use catlet_core::GeneHash;

#[derive(Args, Debug)]
pub struct HashArgs {
    /// File to hash.
    pub file: PathBuf,
}

pub async fn hash_file(path: &Path) -> Result<GeneHash> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(GeneHash::compute(&bytes))
}

pub async fn run_hash(args: &HashArgs) -> Result<u8> {
    let hash = hash_file(&args.file).await?;
    println!("{hash}");
    Ok(0)
}
