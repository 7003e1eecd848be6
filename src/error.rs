//! Structural errors raised while preparing or running a theory.
//!
//! These are distinct from case outcomes: a failing assertion or an unmet
//! assumption is recorded per case and never surfaces here. An empty value
//! pool is a `NotRunnable` verdict, not an error either.

/// Type alias for engine operation results
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors in how a fixture or theory was declared
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("datapoint `{source_name}` declared as {declared} holds a {found} value")]
    DatapointType {
        source_name: String,
        declared: String,
        found: String,
    },

    #[error("enum `{name}` declares member `{member}` more than once")]
    DuplicateEnumMember { name: String, member: String },

    #[error("enum `{name}` declares no members")]
    EmptyEnum { name: String },

    #[error("case {index} of `{test}` has {found} arguments, expected {expected}")]
    CaseArity {
        test: String,
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("parameter `{parameter}` of `{test}` is {declared}, got a {found} argument")]
    ArgumentType {
        test: String,
        parameter: String,
        declared: String,
        found: String,
    },

    #[error("theory `{test}` would produce more cases than fit in 64 bits")]
    CaseCountOverflow { test: String },

    #[error("theory `{test}` produces {count} cases, above the limit of {limit}")]
    CaseLimitExceeded { test: String, count: u64, limit: u64 },

    #[error("report serialization failed: {0}")]
    Report(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Report(err.to_string())
    }
}
