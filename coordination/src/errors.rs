//! Error taxonomy for the trial core.
//!
//! Two layers:
//!
//! | Type                | Raised by                          | Fatal to the run?                   |
//! |---------------------|------------------------------------|-------------------------------------|
//! | `CollaboratorError` | model, lookup, store, topic prompt | depends on the calling step         |
//! | `TrialError`        | review loop, synthesis, entry      | yes, surfaced to the caller         |
//!
//! Gathering tasks swallow `CollaboratorError`s at the stage boundary; review
//! and synthesis wrap them into `TrialError` and abort.

use std::time::Duration;

use thiserror::Error;

use crate::trial::state::TransitionError;

/// Failure reported by an external collaborator.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The call did not complete within the configured per-call timeout.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// The backing service could not be reached or refused the request.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The service answered, but the payload could not be used.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Local I/O failure (filesystem, stdin).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollaboratorError {
    /// Whether a later attempt could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable(_))
    }
}

/// Run-level failure. Any of these aborts the trial before a verdict is written.
#[derive(Debug, Error)]
pub enum TrialError {
    /// The caller never supplied a usable topic.
    #[error("invalid topic after {attempts} attempt(s): {reason}")]
    InvalidTopic { attempts: u32, reason: String },

    /// The judge could not be consulted.
    #[error("review failed in round {round}: {source}")]
    Review {
        round: u32,
        #[source]
        source: CollaboratorError,
    },

    /// The scribe could not be consulted.
    #[error("synthesis failed: {0}")]
    Synthesis(#[source] CollaboratorError),

    /// The verdict could not be written.
    #[error("failed to persist verdict '{name}': {source}")]
    Persistence {
        name: String,
        #[source]
        source: CollaboratorError,
    },

    /// The trial state machine was driven out of order.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl TrialError {
    /// Whether the underlying collaborator failure could clear on a rerun.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Review { source, .. } | Self::Persistence { source, .. } => source.is_transient(),
            Self::Synthesis(source) => source.is_transient(),
            _ => false,
        }
    }
}

/// Result alias for trial operations.
pub type TrialResult<T> = Result<T, TrialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_unavailable_are_transient() {
        let timeout = CollaboratorError::Timeout {
            operation: "search",
            timeout: Duration::from_secs(5),
        };
        assert!(timeout.is_transient());
        assert!(CollaboratorError::Unavailable("503".into()).is_transient());
        assert!(!CollaboratorError::InvalidResponse("not json".into()).is_transient());
    }

    #[test]
    fn trial_errors_inherit_transience() {
        let review = TrialError::Review {
            round: 2,
            source: CollaboratorError::Unavailable("judge offline".into()),
        };
        assert!(review.is_transient());
        let synthesis = TrialError::Synthesis(CollaboratorError::InvalidResponse("garbled".into()));
        assert!(!synthesis.is_transient());
        assert!(!TrialError::Configuration("max_iterations must be at least 1".into()).is_transient());
    }

    #[test]
    fn error_display_includes_context() {
        let err = TrialError::Persistence {
            name: "Test_Monarch_verdict.txt".into(),
            source: CollaboratorError::Unavailable("disk full".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("Test_Monarch_verdict.txt"));
        assert!(msg.contains("disk full"));

        let err = TrialError::InvalidTopic {
            attempts: 3,
            reason: "empty".into(),
        };
        assert!(err.to_string().contains("3 attempt"));
    }
}
