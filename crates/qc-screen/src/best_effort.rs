//! Values from steps that may degrade instead of failing the run

use std::fmt;

/// A value plus the warning explaining why it may be incomplete.
///
/// A degraded step still yields a value (usually empty) so the pipeline can
/// carry on; the warning ends up in the report's `warnings` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestEffort<T> {
    pub value: T,
    pub warning: Option<String>,
}

impl<T> BestEffort<T> {
    /// A complete value
    pub fn complete(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    /// Whether the step degraded
    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }

    /// Split into the value and the warning
    pub fn into_parts(self) -> (T, Option<String>) {
        (self.value, self.warning)
    }
}

impl<T: Default> BestEffort<T> {
    /// An empty value with a warning
    pub fn degraded<S: Into<String>>(warning: S) -> Self {
        Self {
            value: T::default(),
            warning: Some(warning.into()),
        }
    }

    /// Keep an `Ok` value; turn an error into `"<context>: <error>"`
    pub fn from_result<E: fmt::Display>(result: Result<T, E>, context: &str) -> Self {
        match result {
            Ok(value) => Self::complete(value),
            Err(err) => Self::degraded(format!("{}: {}", context, err)),
        }
    }
}
