#![deny(missing_docs)]

//! # catlet-core — Foundational Types for Catlet Genetics
//!
//! This crate defines the value types every other crate in the workspace
//! depends on. It has no internal crate dependencies. From the external
//! ecosystem it uses `serde`, `serde_json`, `thiserror` and `sha2`.
//!
//! ## Design Principles
//!
//! 1. **Validated identifiers.** [`GeneSetIdentifier`], [`GeneName`],
//!    [`Architecture`] and [`GeneHash`] can only be constructed through
//!    parsing functions that normalize to lower case. Equality of two
//!    identifiers is equality of their normalized text.
//!
//! 2. **One configuration model.** [`CatletConfig`] is both the input the
//!    user writes and the output the resolution pipeline produces. Every
//!    mergeable field is an `Option` so that "unset" and "set to default"
//!    stay distinguishable during breeding.
//!
//! 3. **Two traversal modes.** Dependent steps short-circuit through
//!    [`traverse::sequence`]; independent steps aggregate all failures
//!    through [`traverse::aggregate`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `catlet-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod architecture;
pub mod config;
pub mod digest;
pub mod error;
pub mod identity;
pub mod traverse;

// Re-export primary types at crate root for ergonomic imports.
pub use architecture::Architecture;
pub use config::{
    CatletCapabilityConfig, CatletConfig, CatletCpuConfig, CatletDriveConfig, CatletDriveType,
    CatletMemoryConfig, CatletNetworkAdapterConfig, CatletNetworkConfig, CatletSubnetConfig,
    FodderConfig, FodderGeneConfig, MutationType, VariableConfig, VariableType,
};
pub use digest::GeneHash;
pub use error::IdentifierError;
pub use identity::{
    format_gene_reference, is_gene_reference, parse_gene_reference, GeneIdentifier, GeneName,
    GeneSetIdentifier, GeneType, UniqueGeneIdentifier, CATLET_GENE_NAME, GENE_REFERENCE_PREFIX,
    LATEST_TAG,
};
