//! Variable error types.

use thiserror::Error;

/// Errors raised while validating, binding or substituting variables.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariableError {
    /// The variable name is not an identifier.
    #[error("{path}: the variable name '{name}' is invalid (expected letters, digits and '_', not starting with a digit)")]
    InvalidName { path: String, name: String },

    /// Two variables in the same scope share a name.
    #[error("{path}: the variable '{name}' is defined more than once")]
    Duplicate { path: String, name: String },

    /// A required variable has no value.
    #[error("{path}: the variable '{name}' is required but has no value")]
    MissingValue { path: String, name: String },

    /// The value does not satisfy the declared type.
    #[error("{path}: the value {shown} is not a valid {expected}")]
    InvalidValue {
        path: String,
        /// The quoted value, or `<secret>`.
        shown: String,
        expected: &'static str,
    },

    /// A placeholder names a variable that is not in scope.
    #[error("{path}: the placeholder '{token}' references the undefined variable '{name}'")]
    UndefinedReference {
        path: String,
        token: String,
        name: String,
    },

    /// A binding targets a variable that is not declared.
    #[error("found a binding for the variable '{name}' but the variable is not defined")]
    UnknownBinding { name: String },

    /// Several independent errors.
    #[error("{}", render_multiple(.0))]
    Multiple(Vec<VariableError>),
}

fn render_multiple(errors: &[VariableError]) -> String {
    let lines: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
    format!("{} variable errors:\n{}", errors.len(), lines.join("\n"))
}

impl VariableError {
    /// Collapse a list of errors: a single error stays as is, several become
    /// [`VariableError::Multiple`]. Nested lists are flattened.
    pub fn from_list(errors: Vec<VariableError>) -> Self {
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

    /// The individual errors contained in this error.
    pub fn flatten(&self) -> Vec<&VariableError> {
        match self {
            Self::Multiple(inner) => inner.iter().flat_map(|e| e.flatten()).collect(),
            other => vec![other],
        }
    }
}

/// Result type alias for variable operations.
pub type VariableResult<T> = Result<T, VariableError>;
