//! # Genetics Errors
//!
//! Every pipeline stage wraps the errors of the stage below it with a line
//! of context, so the final message reads from the outermost operation down
//! to the root cause:
//!
//! ```text
//! could not resolve genes in the ancestor catlet -> dbosoft/utt/latest:
//!   could not resolve the gene set tag 'dbosoft/base/latest' (dbosoft/base/latest -> dbosoft/base/1.0):
//!   the gene set 'dbosoft/base/1.0' does not exist in the local genepool
//! ```
//!
//! Independent failures (several genes, several fodder items) are collected
//! into [`GeneticsError::Multiple`].

use catlet_core::traverse::aggregate;
use catlet_core::{Architecture, GeneIdentifier, GeneSetIdentifier, IdentifierError};
use catlet_genepool::GenePoolError;
use catlet_variables::VariableError;
use thiserror::Error;

/// Errors raised by the resolution pipeline.
#[derive(Error, Debug)]
pub enum GeneticsError {
    /// A malformed identifier or gene reference.
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// The gene pool could not serve a read.
    #[error(transparent)]
    Pool(#[from] GenePoolError),

    /// Variable binding or substitution failed.
    #[error(transparent)]
    Variables(#[from] VariableError),

    /// A geneset tag refers back to a tag already on the chain.
    #[error("the gene set '{0}' is part of a circular reference")]
    CircularReference(GeneSetIdentifier),

    /// The tag reference chain exceeds the configured maximum.
    #[error("the gene set reference chain is longer than the maximum of {max}")]
    ReferenceChainTooLong { max: usize },

    /// An ancestor appears twice in the pedigree.
    #[error("the pedigree contains a circle: {trace}")]
    CircularAncestry { trace: String },

    /// The pedigree exceeds the configured maximum number of ancestors.
    #[error("the pedigree has more than {max} ancestors: {trace}")]
    PedigreeTooLong { max: usize, trace: String },

    /// No variant of the gene exists in the geneset.
    #[error("the gene '{0}' does not exist")]
    GeneNotFound(GeneIdentifier),

    /// No variant of the gene supports the target hypervisor.
    #[error("the gene '{gene}' is not compatible with the hypervisor '{}'", .architecture.hypervisor())]
    IncompatibleHypervisor {
        gene: GeneIdentifier,
        architecture: Architecture,
    },

    /// No variant of the gene supports the target processor architecture.
    #[error("the gene '{gene}' is not compatible with the processor architecture '{}'", .architecture.processor())]
    IncompatibleProcessor {
        gene: GeneIdentifier,
        architecture: Architecture,
    },

    /// A named fragment is missing from a fodder gene.
    #[error("the fodder '{name}' does not exist in the gene '{gene}'")]
    FodderNotFound { gene: String, name: String },

    /// Stored JSON does not describe the expected document.
    #[error("could not deserialize {what}: {source}")]
    Deserialize {
        what: String,
        source: serde_json::Error,
    },

    /// An internal invariant was violated.
    #[error("{0}. This is a BUG and should not happen")]
    Internal(String),

    /// A lower error with the operation that failed.
    #[error("{context}: {inner}")]
    Context {
        context: String,
        inner: Box<GeneticsError>,
    },

    /// Several independent errors.
    #[error("{}", render_multiple(.0))]
    Multiple(Vec<GeneticsError>),
}

fn render_multiple(errors: &[GeneticsError]) -> String {
    let lines: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
    format!("{} errors:\n{}", errors.len(), lines.join("\n"))
}

impl GeneticsError {
    /// Wrap this error with the operation that failed.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            inner: Box::new(self),
        }
    }

    /// Collapse a list of errors: a single error stays as is, several become
    /// [`GeneticsError::Multiple`]. Nested lists are flattened.
    pub fn from_list(errors: Vec<GeneticsError>) -> Self {
        let mut flat = Vec::with_capacity(errors.len());
        for e in errors {
            match e {
                Self::Multiple(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Self::Multiple(flat)
        }
    }

    /// The error below all context layers.
    pub fn root_cause(&self) -> &GeneticsError {
        match self {
            Self::Context { inner, .. } => inner.root_cause(),
            other => other,
        }
    }

    /// Root causes of every independent failure, looking through context
    /// layers and multi-errors.
    pub fn root_causes(&self) -> Vec<&GeneticsError> {
        match self.root_cause() {
            Self::Multiple(inner) => inner.iter().flat_map(|e| e.root_causes()).collect(),
            other => vec![other],
        }
    }
}

/// Result type alias for pipeline operations.
pub type GeneticsResult<T> = Result<T, GeneticsError>;

/// Attach context to a fallible pipeline step.
pub trait ResultExt<T> {
    /// Wrap the error, if any, with the context produced by `f`.
    fn with_context<C: Into<String>>(self, f: impl FnOnce() -> C) -> GeneticsResult<T>;
}

impl<T, E: Into<GeneticsError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, f: impl FnOnce() -> C) -> GeneticsResult<T> {
        self.map_err(|e| e.into().context(f()))
    }
}

/// Run independent pipeline steps and report every failure at once.
///
/// The successful values come back in order. Failures are folded with
/// [`GeneticsError::from_list`].
pub fn aggregate_all<T>(
    steps: impl IntoIterator<Item = GeneticsResult<T>>,
) -> GeneticsResult<Vec<T>> {
    aggregate(steps).map_err(GeneticsError::from_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(value: &str) -> GeneSetIdentifier {
        GeneSetIdentifier::parse(value).unwrap()
    }

    #[test]
    fn context_renders_outer_to_inner() {
        let err = GeneticsError::CircularReference(set("acme/base/latest"))
            .context("could not resolve the gene set tag 'acme/base/latest'");
        assert_eq!(
            format!("{err}"),
            "could not resolve the gene set tag 'acme/base/latest': \
             the gene set 'acme/base/latest' is part of a circular reference"
        );
        assert!(matches!(
            err.root_cause(),
            GeneticsError::CircularReference(_)
        ));
    }

    #[test]
    fn internal_errors_are_flagged_as_bugs() {
        let err = GeneticsError::Internal("gene missing from the resolved map".into());
        assert!(format!("{err}").contains("BUG"));
    }

    #[test]
    fn multiple_flattens_and_counts() {
        let a = GeneticsError::Internal("a".into());
        let b = GeneticsError::Internal("b".into()).context("ctx");
        let c = GeneticsError::Internal("c".into());
        let err = GeneticsError::from_list(vec![
            GeneticsError::from_list(vec![a, b]),
            c,
        ]);
        assert!(format!("{err}").starts_with("3 errors:"));
        assert_eq!(err.root_causes().len(), 3);
    }

    #[test]
    fn single_error_list_is_unwrapped() {
        let err = GeneticsError::from_list(vec![GeneticsError::Internal("x".into())]);
        assert!(matches!(err, GeneticsError::Internal(_)));
    }

    #[test]
    fn with_context_converts_lower_errors() {
        let result: Result<(), IdentifierError> =
            Err(IdentifierError::InvalidGeneHash("nope".into()));
        let err = result.with_context(|| "reading manifest").unwrap_err();
        assert!(format!("{err}").starts_with("reading manifest: "));
        assert!(matches!(err.root_cause(), GeneticsError::Identifier(_)));
    }

    #[test]
    fn aggregate_all_keeps_values_or_every_failure() {
        let ok: Vec<GeneticsResult<u8>> = vec![Ok(1), Ok(2)];
        assert_eq!(aggregate_all(ok).unwrap(), vec![1, 2]);

        let mixed = vec![
            Ok(1),
            Err(GeneticsError::Internal("a".into())),
            Err(GeneticsError::Internal("b".into())),
        ];
        let err = aggregate_all(mixed).unwrap_err();
        assert_eq!(err.root_causes().len(), 2);
    }
}
