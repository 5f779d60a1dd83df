//! Journal error types

use thiserror::Error;

use super::mode::ReportMode;
use crate::store::StoreError;

/// Errors raised by the journal core
#[derive(Error, Debug)]
pub enum ReflectionError {
    /// Unrecognized mode or other programmer error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The persistence store rejected or failed the submission.
    /// The draft is left untouched.
    #[error("Failed to save {mode} reflection: {source}")]
    Submission {
        mode: ReportMode,
        #[source]
        source: StoreError,
    },

    /// A submission is already pending
    #[error("The {0} reflection is already being submitted")]
    SubmissionInFlight(ReportMode),

    /// A completion arrived with no matching pending submission
    #[error("No {0} submission is in flight")]
    NotSubmitting(ReportMode),
}

/// Result type alias for journal operations
pub type ReflectionResult<T> = Result<T, ReflectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReflectionError::SubmissionInFlight(ReportMode::Evening);
        assert_eq!(err.to_string(), "The evening reflection is already being submitted");

        let err = ReflectionError::Submission {
            mode: ReportMode::Morning,
            source: StoreError::Unavailable("offline".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to save morning reflection: Store unavailable: offline"
        );
    }
}
