//! Engine error types

use thiserror::Error;

/// Fatal engine failures. Per-record problems are diagnostics, not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("internal consistency violation: {details}")]
    InternalConsistency { details: String },
}

impl EngineError {
    pub(crate) fn inconsistent(details: impl Into<String>) -> Self {
        EngineError::InternalConsistency {
            details: details.into(),
        }
    }
}
