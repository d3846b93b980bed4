//! # CLI Handlers Over a Filesystem Pool
//!
//! Drives the `catlet` subcommand handlers the way the binary does, with
//! settings pointing at a fixture pool.

mod common;

use catlet_cli::build::{build_config, BuildArgs, OutputFormat};
use catlet_cli::geneset::{list_genes, resolve_geneset, GenesetArgs};
use catlet_cli::settings::{Settings, SettingsOverrides};
use common::{arch, PoolFixture};
use tokio_util::sync::CancellationToken;

const FOOD_GENE: &str = r#"{
    "name": "food",
    "variables": [ { "name": "who", "value": "world" } ],
    "fodder": [ { "name": "hello", "content": "hello {{ who }}" } ]
}"#;

fn settings(pool: &PoolFixture) -> Settings {
    let mut settings = Settings::default();
    settings.apply_overrides(&SettingsOverrides {
        genepool_path: Some(pool.root().to_path_buf()),
        ..Default::default()
    });
    settings
}

fn fixture() -> PoolFixture {
    PoolFixture::new()
        .reference("dbosoft/utt/latest", "dbosoft/utt/1.0")
        .catlet(
            "dbosoft/utt/1.0",
            r#"{ "name": "utt", "drives": [ { "name": "sda" } ] }"#,
        )
        .volume("dbosoft/utt/1.0", "sda", "hyperv/amd64", b"amd64 disk")
        .volume("dbosoft/utt/1.0", "sda", "hyperv/arm64", b"arm64 disk")
        .fodder("acme/food/1.0", "food", "any", FOOD_GENE)
}

fn build_args(config: std::path::PathBuf) -> BuildArgs {
    BuildArgs {
        config,
        arch: None,
        vars: Vec::new(),
        no_substitute: false,
        format: OutputFormat::Json,
    }
}

#[tokio::test]
async fn build_prints_config_genes_and_pedigree() {
    let pool = fixture();
    let config_path = pool.root().join("child.json");
    std::fs::write(
        &config_path,
        r#"{ "parent": "dbosoft/utt", "fodder": [ { "source": "gene:acme/food/1.0:food" } ] }"#,
    )
    .unwrap();

    let rendered = build_config(
        &build_args(config_path),
        &settings(&pool),
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    let output: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(output["config"]["parent"], "dbosoft/utt/1.0");
    assert_eq!(output["config"]["drives"][0]["source"], "gene:dbosoft/utt/1.0:sda");
    assert_eq!(output["config"]["fodder"][0]["content"], "hello world");
    let genes = output["genes"].as_object().unwrap();
    assert_eq!(genes.len(), 3);
    assert!(genes.keys().any(|k| k.contains("hyperv/amd64")));
    assert!(!genes.keys().any(|k| k.contains("arm64")));
    assert_eq!(output["pedigree"][0]["reference"], "dbosoft/utt/latest");
}

#[tokio::test]
async fn architecture_flag_selects_another_variant() {
    let pool = fixture();
    let config_path = pool.root().join("child.json");
    std::fs::write(&config_path, r#"{ "parent": "dbosoft/utt/1.0" }"#).unwrap();

    let args = BuildArgs {
        arch: Some(arch("hyperv/arm64")),
        ..build_args(config_path)
    };
    let rendered = build_config(&args, &settings(&pool), &CancellationToken::new())
        .await
        .unwrap();
    let output: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    let genes = output["genes"].as_object().unwrap();
    assert!(genes.keys().any(|k| k.contains("hyperv/arm64")));
}

#[tokio::test]
async fn resolve_and_genes_read_the_same_pool() {
    let pool = fixture();
    let settings = settings(&pool);
    let cancel = CancellationToken::new();

    let resolved = resolve_geneset(
        &GenesetArgs {
            geneset: "dbosoft/utt".into(),
        },
        &settings,
        &cancel,
    )
    .await
    .unwrap();
    assert_eq!(resolved.to_string(), "dbosoft/utt/1.0");

    let genes = list_genes(
        &GenesetArgs {
            geneset: resolved.to_string(),
        },
        &settings,
        &cancel,
    )
    .await
    .unwrap();
    assert_eq!(genes.len(), 3);
}
