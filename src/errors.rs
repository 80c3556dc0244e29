//! Errors raised while turning request parameters into a query.
//!
//! Composition itself never fails: malformed filters degrade to equality
//! predicates or are skipped with a warning. Only the boundary that builds a
//! [`ParamMap`](crate::models::ParamMap) from untyped input can reject.
//! Failures from the data source are never wrapped here; they reach the
//! caller of `execute`/`count_total` unmodified.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The parameter source was not a key/value object
    #[error("query parameters must be an object")]
    NotAnObject,

    /// A parameter carried a value that is neither text nor a number
    #[error("parameter '{key}' has unsupported {kind} value")]
    UnsupportedParam { key: String, kind: &'static str },
}

impl QueryError {
    pub fn unsupported(key: impl Into<String>, kind: &'static str) -> Self {
        let key = key.into();
        tracing::warn!(key = %key, kind, "Rejected query parameter");
        Self::UnsupportedParam { key, kind }
    }
}
