use pipeline_action_core::contract::FailureDetails;

use crate::error::ActionError;
use crate::job::{JobFailure, StoredOutputs};
use crate::stages::ActionContext;

pub async fn report_success(stored: StoredOutputs, context: ActionContext) -> Result<(), ActionError> {
    context
        .services
        .job_status
        .put_job_success(stored.job.id())
        .await
        .map_err(ActionError::JobStatus)
}

pub async fn report_failure(failure: JobFailure, context: ActionContext) -> Result<(), ActionError> {
    let details = FailureDetails::job_failed(failure.message);
    context
        .services
        .job_status
        .put_job_failure(&failure.job.id, &details)
        .await
        .map_err(ActionError::JobStatus)
}
