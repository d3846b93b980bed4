//! # catlet-cli — Command-Line Front End
//!
//! Provides the `catlet` binary, which runs the genetics pipeline against a
//! local gene pool directory.
//!
//! ## Subcommands
//!
//! - `catlet build` — resolve a catlet configuration, bind variables and
//!   substitute placeholders; prints the configuration and its genes.
//! - `catlet resolve` — follow a geneset tag to its concrete version.
//! - `catlet genes` — list the gene variants of a geneset tag.
//! - `catlet hash` — print the gene hash of a file.
//!
//! ```bash
//! catlet build --config catlet.yaml --var password=secret --format yaml
//! catlet resolve dbosoft/ubuntu-22.04
//! catlet -v genes dbosoft/ubuntu-22.04/1.0
//! ```
//!
//! Settings are described in [`settings`].

pub mod build;
pub mod geneset;
pub mod hash;
pub mod settings;
