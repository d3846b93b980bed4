//! # Traversal Helpers
//!
//! Two ways of running a sequence of fallible steps:
//!
//! - [`sequence`] for dependent steps. It stops at the first failure, so
//!   later steps that would build on a failed one never run.
//! - [`aggregate`] for independent steps. Every step runs and all failures
//!   are returned together, so one pass reports every problem.

/// Run dependent steps in order, returning the first failure.
///
/// Steps are pulled lazily from the iterator; nothing after the first
/// failure is evaluated.
pub fn sequence<T, E, I>(steps: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut values = Vec::new();
    for step in steps {
        values.push(step?);
    }
    Ok(values)
}

/// Run every independent step and collect all failures.
///
/// Returns the successful values in order when no step failed, otherwise
/// every failure in the order encountered.
pub fn aggregate<T, E, I>(steps: I) -> Result<Vec<T>, Vec<E>>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut values = Vec::new();
    let mut errors = Vec::new();
    for step in steps {
        match step {
            Ok(v) => values.push(v),
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}
