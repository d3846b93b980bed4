//! # Variable Validation
//!
//! Validates variable declarations in one scope and resolves each to the
//! value a placeholder will be replaced with.

use std::collections::{BTreeMap, HashSet};

use catlet_core::traverse::aggregate;
use catlet_core::{VariableConfig, VariableType};

use crate::error::VariableError;

/// A variable ready for substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariable {
    /// The substituted text.
    pub value: String,
    /// Whether using the variable taints the result as secret.
    pub secret: bool,
}

/// Variables of one scope keyed by name.
pub type VariableScope = BTreeMap<String, ResolvedVariable>;

/// Whether `name` is a valid variable name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `value` satisfies `variable_type`.
///
/// Booleans must be exactly `true` or `false`; numbers must parse as a
/// finite decimal.
pub fn validate_value(value: &str, variable_type: VariableType) -> bool {
    match variable_type {
        VariableType::String => true,
        VariableType::Boolean => value == "true" || value == "false",
        VariableType::Number => value
            .parse::<f64>()
            .map(|n| n.is_finite())
            .unwrap_or(false),
    }
}

/// Substitution text of a variable without a value.
pub fn default_value(variable_type: VariableType) -> &'static str {
    match variable_type {
        VariableType::String => "",
        VariableType::Number => "0",
        VariableType::Boolean => "false",
    }
}

/// Path of a variable inside a scope (`Variables[Name=x]` or
/// `<scope>.Variables[Name=x]`).
pub fn variable_path(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        format!("Variables[Name={name}]")
    } else {
        format!("{scope}.Variables[Name={name}]")
    }
}

/// Validate one variable and resolve its substitution value.
pub fn resolve_variable(
    variable: &VariableConfig,
    scope: &str,
) -> Result<ResolvedVariable, VariableError> {
    let path = variable_path(scope, &variable.name);
    if !is_valid_name(&variable.name) {
        return Err(VariableError::InvalidName {
            path,
            name: variable.name.clone(),
        });
    }
    let variable_type = variable.effective_type();
    let value = match &variable.value {
        Some(value) => {
            if !validate_value(value, variable_type) {
                return Err(VariableError::InvalidValue {
                    path: format!("{path}.Value"),
                    shown: if variable.is_secret() {
                        "<secret>".to_string()
                    } else {
                        format!("'{value}'")
                    },
                    expected: variable_type.as_str(),
                });
            }
            value.clone()
        }
        None if variable.is_required() => {
            return Err(VariableError::MissingValue {
                path,
                name: variable.name.clone(),
            })
        }
        None => default_value(variable_type).to_string(),
    };
    Ok(ResolvedVariable {
        value,
        secret: variable.is_secret(),
    })
}

/// Validate all variables of a scope, collecting every error.
pub fn resolve_variables(
    variables: &[VariableConfig],
    scope: &str,
) -> Result<VariableScope, Vec<VariableError>> {
    let mut seen = HashSet::new();
    let resolved = aggregate(variables.iter().map(|variable| {
        if !seen.insert(variable.name.as_str()) {
            return Err(VariableError::Duplicate {
                path: variable_path(scope, &variable.name),
                name: variable.name.clone(),
            });
        }
        resolve_variable(variable, scope).map(|v| (variable.name.clone(), v))
    }))?;
    Ok(resolved.into_iter().collect())
}
