//! Error types for pipeline setup and job processing.

use pipeline_action_core::archive::ArchiveError;
use pipeline_action_core::artifact_location::UnsupportedLocation;
use pipeline_action_core::contract::ValidationError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Raised while building a pipeline, before any invocation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("pipeline configuration requires an input handler")]
    MissingInputHandler,
}

/// A fatal job-processing failure. Every variant ends the invocation and is
/// reported to the orchestrator as a job failure when a job id is known.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("event does not contain a '{key}' job description")]
    MissingJob { key: &'static str },

    #[error("malformed job description: {0}")]
    MalformedJob(String),

    #[error(transparent)]
    InvalidJob(#[from] ValidationError),

    #[error(transparent)]
    UnsupportedLocation(#[from] UnsupportedLocation),

    #[error("failed to fetch artifact '{artifact}': {message}")]
    Fetch { artifact: String, message: String },

    #[error("artifact '{artifact}' must contain exactly one entry but contains {entries}")]
    EntryCount { artifact: String, entries: usize },

    #[error("artifact '{artifact}' is not a valid archive: {source}")]
    Archive {
        artifact: String,
        #[source]
        source: ArchiveError,
    },

    #[error("artifact '{artifact}' does not contain valid JSON")]
    InvalidJson { artifact: String },

    #[error("expected {expected} decoded inputs but received {actual}")]
    InputArity { expected: usize, actual: usize },

    #[error("expected {expected} output values but received {actual}")]
    OutputArity { expected: usize, actual: usize },

    #[error("failed to store artifact '{artifact}': {message}")]
    Store { artifact: String, message: String },

    #[error("{source}")]
    Handler {
        #[source]
        source: BoxError,
    },

    #[error("{0}")]
    JobStatus(String),
}

impl ActionError {
    /// Wraps a handler failure. Handlers returning an `ActionError` keep it as is.
    pub fn handler(source: impl Into<BoxError>) -> Self {
        match source.into().downcast::<ActionError>() {
            Ok(error) => *error,
            Err(source) => Self::Handler { source },
        }
    }

    /// Classifies an archive failure for the named artifact.
    pub fn from_archive(artifact: &str, error: ArchiveError) -> Self {
        match error {
            ArchiveError::EntryCount(entries) => Self::EntryCount {
                artifact: artifact.to_string(),
                entries,
            },
            source => Self::Archive {
                artifact: artifact.to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_errors_surface_their_own_message() {
        let error = ActionError::handler("boom");
        assert_eq!(error.to_string(), "boom");
    }

    #[test]
    fn handler_returning_action_error_keeps_its_variant() {
        let error = ActionError::handler(ActionError::OutputArity {
            expected: 2,
            actual: 1,
        });
        assert!(matches!(
            error,
            ActionError::OutputArity {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn entry_count_archive_errors_name_the_artifact() {
        let error = ActionError::from_archive("SourceArtifact", ArchiveError::EntryCount(3));
        assert_eq!(
            error.to_string(),
            "artifact 'SourceArtifact' must contain exactly one entry but contains 3"
        );
    }
}
