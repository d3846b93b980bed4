//! Caller-supplied values for catlet variables.

use std::collections::BTreeMap;

use catlet_core::CatletConfig;

use crate::error::{VariableError, VariableResult};

/// Bind `values` to the catlet-level variables of `config`.
///
/// A bound value replaces the declared value. Type checks happen later,
/// during substitution, like for any other value.
///
/// # Errors
///
/// [`VariableError::UnknownBinding`] for every bound name the configuration
/// does not declare.
pub fn apply_bindings(
    config: &CatletConfig,
    values: &BTreeMap<String, String>,
) -> VariableResult<CatletConfig> {
    let unknown: Vec<VariableError> = values
        .keys()
        .filter(|name| !config.variables.iter().any(|v| &v.name == *name))
        .map(|name| VariableError::UnknownBinding { name: name.clone() })
        .collect();
    if !unknown.is_empty() {
        return Err(VariableError::from_list(unknown));
    }

    let mut bound = config.clone();
    for variable in &mut bound.variables {
        if let Some(value) = values.get(&variable.name) {
            tracing::debug!(variable = %variable.name, "binding variable");
            variable.value = Some(value.clone());
        }
    }
    Ok(bound)
}
