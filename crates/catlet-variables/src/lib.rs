//! # catlet-variables — Variables and Substitution
//!
//! Resolves `{{ name }}` placeholders in a fed catlet configuration and
//! validates every variable on the way.
//!
//! ## Scopes
//!
//! - **Catlet variables** (`config.variables`) are visible everywhere.
//! - **Fodder variables** (`fodder[].variables`) shadow catlet variables of
//!   the same name inside their own fodder item. Their values may
//!   themselves reference catlet variables, one level deep.
//!
//! ## Secrecy
//!
//! A fodder item whose content uses a secret variable becomes secret. A
//! fodder variable whose value uses a secret catlet variable becomes secret.
//!
//! ## Errors
//!
//! Independent problems are collected, so one call reports every missing,
//! invalid or undefined variable in the configuration. Each error names its
//! location, e.g. `Fodder[Name=x].Variables[Name=y].Value`.

pub mod binding;
pub mod error;
pub mod substitution;
pub mod validation;

pub use binding::apply_bindings;
pub use error::{VariableError, VariableResult};
pub use substitution::{fodder_path, substitute_text, substitute_variables};
pub use validation::{resolve_variables, validate_value, ResolvedVariable, VariableScope};
