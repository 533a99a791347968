use pipeline_action_core::contract::{check_job_shape, Job, ValidationError};
use serde_json::json;

use crate::error::ActionError;
use crate::job::ValidatedJob;
use crate::stages::ActionContext;

/// Checks the job against the configured artifact counts and attaches a store
/// client scoped to the job's artifact credentials.
pub fn validate_job(job: Job, context: &ActionContext) -> Result<ValidatedJob, ActionError> {
    check_job_shape(
        &job,
        context.num_input_artifacts,
        context.num_output_artifacts,
    )?;

    let Some(credentials) = job.artifact_credentials() else {
        return Err(ValidationError::new("job data is missing artifactCredentials").into());
    };
    let store = context.services.stores.for_credentials(credentials);

    context.diagnostics().info(
        "job_validated",
        json!({
            "job_id": job.id.clone(),
            "input_artifacts": job.input_artifacts().len(),
            "output_artifacts": job.output_artifacts().len(),
        }),
    );
    Ok(ValidatedJob::new(job, store))
}
