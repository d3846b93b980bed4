//! # catlet-genepool — The Local Gene Pool
//!
//! The gene pool is the local, append-only, content-addressed store of
//! genesets and their genes. This crate provides everything the resolution
//! pipeline needs to read it, and nothing that writes to it:
//!
//! - **Addressing** ([`addressing`]): pure functions between identities and
//!   on-disk paths, in both directions.
//! - **Manifests** ([`manifest`]): the `geneset-tag.json` format, including
//!   the optional `ref` redirect to another tag.
//! - **Reader** ([`reader`]): the async [`GenePoolReader`] trait the pipeline
//!   consumes, with a filesystem backend ([`LocalGenePool`]) and an
//!   in-memory backend ([`MemoryGenePool`]).
//!
//! ## Layout
//!
//! ```text
//! <pool>/<org>/<set>/<tag>/geneset-tag.json
//! <pool>/<org>/<set>/<tag>/catlet.json
//! <pool>/<org>/<set>/<tag>/volumes/[<hypervisor>/[<processor>/]]<name>.vhdx
//! <pool>/<org>/<set>/<tag>/fodder/[<hypervisor>/[<processor>/]]<name>.json
//! ```

pub mod addressing;
pub mod error;
pub mod local;
pub mod manifest;
pub mod memory;
pub mod reader;

pub use error::{GenePoolError, GenePoolResult};
pub use local::LocalGenePool;
pub use manifest::{GeneManifestEntry, GenesetTagManifest};
pub use memory::MemoryGenePool;
pub use reader::{GeneListing, GenePoolReader};
