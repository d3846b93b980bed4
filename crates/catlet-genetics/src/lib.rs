//! # catlet-genetics — The Resolution Pipeline
//!
//! Turns a user-authored catlet configuration and its ancestry into one
//! self-contained configuration, plus the map of every gene it depends on
//! to the content hash of the selected variant.
//!
//! ## Stages
//!
//! | Stage | Module |
//! |---|---|
//! | Normalize gene references | [`references`] |
//! | Follow geneset tag redirects | [`geneset`] |
//! | Walk the parent chain | [`pedigree`] |
//! | Merge parent and child | [`breeding`] |
//! | Fill provisioning defaults | [`defaults`] |
//! | Collect referenced genes | [`collector`] |
//! | Select variants by architecture | [`genes`] |
//! | Expand fodder genes | [`feeding`] |
//! | Run everything | [`build`](mod@build) |
//!
//! The pipeline only reads: all gene pool access goes through
//! [`catlet_genepool::GenePoolReader`], and every read observes the
//! caller's cancellation token.
//!
//! ## Errors
//!
//! Dependent steps (following a reference chain, walking ancestors) stop at
//! the first failure. Independent steps (resolving the genes of one
//! configuration, expanding its fodder) report every failure at once. Each
//! stage wraps lower errors with its own context; see [`GeneticsError`].

pub mod breeding;
pub mod build;
pub mod collector;
pub mod defaults;
pub mod error;
pub mod feeding;
pub mod genes;
pub mod geneset;
pub mod options;
pub mod pedigree;
pub mod references;

pub use build::{build, build_and_substitute, ResolvedCatlet};
pub use error::{GeneticsError, GeneticsResult};
pub use genes::{ResolvedGene, ResolvedGenes};
pub use options::GeneticsOptions;
pub use pedigree::AncestorInfo;
