use serde::{Deserialize, Serialize};

/// Key under which the orchestrator places the job description in the invocation event.
pub const JOB_EVENT_KEY: &str = "CodePipeline.job";
pub const DEFAULT_NUM_INPUT_ARTIFACTS: usize = 1;
pub const DEFAULT_NUM_OUTPUT_ARTIFACTS: usize = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JobData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_artifacts: Option<Vec<Artifact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_artifacts: Option<Vec<Artifact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_credentials: Option<ArtifactCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub location: ArtifactLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactLocation {
    #[serde(rename = "type")]
    pub location_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_location: Option<S3Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct S3Location {
    pub bucket_name: String,
    pub object_key: String,
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

impl std::fmt::Debug for ArtifactCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureType {
    JobFailed,
}

impl FailureType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JobFailed => "JobFailed",
        }
    }
}

/// Payload sent to the orchestrator when a job ends in failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureDetails {
    pub message: String,
    #[serde(rename = "type")]
    pub failure_type: FailureType,
}

impl FailureDetails {
    pub fn job_failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            failure_type: FailureType::JobFailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

impl Job {
    /// Input artifacts, or an empty slice when the job carries none.
    pub fn input_artifacts(&self) -> &[Artifact] {
        self.data
            .as_ref()
            .and_then(|data| data.input_artifacts.as_deref())
            .unwrap_or_default()
    }

    pub fn output_artifacts(&self) -> &[Artifact] {
        self.data
            .as_ref()
            .and_then(|data| data.output_artifacts.as_deref())
            .unwrap_or_default()
    }

    pub fn artifact_credentials(&self) -> Option<&ArtifactCredentials> {
        self.data
            .as_ref()
            .and_then(|data| data.artifact_credentials.as_ref())
    }
}

/// Checks the job description against the expected shape and artifact counts.
///
/// Checks run in a fixed order and the first violation wins, so the message
/// always names the earliest missing section or mismatched count.
pub fn check_job_shape(
    job: &Job,
    expected_inputs: usize,
    expected_outputs: usize,
) -> Result<(), ValidationError> {
    let Some(data) = job.data.as_ref() else {
        return Err(ValidationError::new("job is missing its data section"));
    };

    let Some(input_artifacts) = data.input_artifacts.as_ref() else {
        return Err(ValidationError::new("job data is missing inputArtifacts"));
    };

    let Some(output_artifacts) = data.output_artifacts.as_ref() else {
        return Err(ValidationError::new("job data is missing outputArtifacts"));
    };

    if input_artifacts.len() != expected_inputs {
        return Err(ValidationError::new(format!(
            "job has {} input artifacts but {expected_inputs} were expected",
            input_artifacts.len()
        )));
    }

    if output_artifacts.len() != expected_outputs {
        return Err(ValidationError::new(format!(
            "job has {} output artifacts but {expected_outputs} were expected",
            output_artifacts.len()
        )));
    }

    Ok(())
}
