//! # Placeholder Substitution
//!
//! Replaces `{{ name }}` placeholders in fodder content and fodder variable
//! values. Whitespace around the name is ignored. An opening `{{` without a
//! closing `}}` is left as literal text.
//!
//! Fodder variable values are substituted first, against the catlet scope
//! only. The fodder content is then substituted against the catlet scope
//! overlaid with the fodder scope.

use catlet_core::{CatletConfig, FodderConfig, VariableConfig};

use crate::error::{VariableError, VariableResult};
use crate::validation::{
    resolve_variable, resolve_variables, variable_path, ResolvedVariable, VariableScope,
};

/// A `{{ … }}` occurrence in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placeholder<'a> {
    start: usize,
    end: usize,
    token: &'a str,
    name: &'a str,
}

fn placeholders(input: &str) -> Vec<Placeholder<'_>> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(open) = input[pos..].find("{{") {
        let start = pos + open;
        let inner = start + 2;
        let Some(close) = input[inner..].find("}}") else {
            break;
        };
        let end = inner + close + 2;
        found.push(Placeholder {
            start,
            end,
            token: &input[start..end],
            name: input[inner..inner + close].trim(),
        });
        pos = end;
    }
    found
}

/// Substitute every placeholder of `input` from `scope`.
///
/// Returns the substituted text and whether a secret variable was used.
/// All undefined references in the text are reported together.
pub fn substitute_text(
    input: &str,
    path: &str,
    scope: &VariableScope,
) -> Result<(String, bool), Vec<VariableError>> {
    let mut output = String::with_capacity(input.len());
    let mut errors = Vec::new();
    let mut secret = false;
    let mut last = 0;
    for placeholder in placeholders(input) {
        output.push_str(&input[last..placeholder.start]);
        match scope.get(placeholder.name) {
            Some(variable) => {
                output.push_str(&variable.value);
                secret |= variable.secret;
            }
            None => errors.push(VariableError::UndefinedReference {
                path: path.to_string(),
                token: placeholder.token.to_string(),
                name: placeholder.name.to_string(),
            }),
        }
        last = placeholder.end;
    }
    output.push_str(&input[last..]);
    if errors.is_empty() {
        Ok((output, secret))
    } else {
        Err(errors)
    }
}

/// Resolve a scope, recording errors but still returning an entry for every
/// declared name so that references to a broken variable are not reported
/// a second time as undefined.
fn resolve_scope(
    variables: &[VariableConfig],
    scope: &str,
    errors: &mut Vec<VariableError>,
) -> VariableScope {
    match resolve_variables(variables, scope) {
        Ok(resolved) => resolved,
        Err(scope_errors) => {
            errors.extend(scope_errors);
            variables
                .iter()
                .map(|v| {
                    let resolved = resolve_variable(v, scope).unwrap_or(ResolvedVariable {
                        value: String::new(),
                        secret: v.is_secret(),
                    });
                    (v.name.clone(), resolved)
                })
                .collect()
        }
    }
}

/// Location of a fodder item in error messages: `Fodder[Name=x]` for named
/// items, `Fodder[i]` otherwise.
pub fn fodder_path(index: usize, fodder: &FodderConfig) -> String {
    match &fodder.name {
        Some(name) => format!("Fodder[Name={name}]"),
        None => format!("Fodder[{index}]"),
    }
}

fn substitute_fodder(
    index: usize,
    fodder: &FodderConfig,
    catlet_scope: &VariableScope,
    errors: &mut Vec<VariableError>,
) -> FodderConfig {
    let path = fodder_path(index, fodder);
    let mut result = fodder.clone();

    for variable in &mut result.variables {
        let Some(value) = &variable.value else {
            continue;
        };
        let value_path = format!("{}.Value", variable_path(&path, &variable.name));
        match substitute_text(value, &value_path, catlet_scope) {
            Ok((substituted, secret)) => {
                variable.value = Some(substituted);
                if secret {
                    variable.secret = Some(true);
                }
            }
            Err(e) => errors.extend(e),
        }
    }

    let mut scope = catlet_scope.clone();
    scope.extend(resolve_scope(&result.variables, &path, errors));

    if let Some(content) = &fodder.content {
        match substitute_text(content, &format!("{path}.Content"), &scope) {
            Ok((substituted, secret)) => {
                result.content = Some(substituted);
                if secret {
                    result.secret = Some(true);
                }
            }
            Err(e) => errors.extend(e),
        }
    }
    result
}

/// Substitute all placeholders of a fed configuration.
///
/// Catlet variables are validated; fodder variable values and fodder
/// content are substituted. A configuration without placeholders is
/// returned unchanged.
///
/// # Errors
///
/// Every invalid, missing or undefined variable across all fodder items,
/// combined with [`VariableError::from_list`].
pub fn substitute_variables(config: &CatletConfig) -> VariableResult<CatletConfig> {
    let mut errors = Vec::new();
    let catlet_scope = resolve_scope(&config.variables, "", &mut errors);

    let fodder: Vec<FodderConfig> = config
        .fodder
        .iter()
        .enumerate()
        .map(|(i, f)| substitute_fodder(i, f, &catlet_scope, &mut errors))
        .collect();

    if !errors.is_empty() {
        return Err(VariableError::from_list(errors));
    }
    tracing::debug!(
        variables = catlet_scope.len(),
        fodder = fodder.len(),
        "substituted catlet variables"
    );
    Ok(CatletConfig {
        fodder,
        ..config.clone()
    })
}
