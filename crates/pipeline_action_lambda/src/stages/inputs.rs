use futures::future::try_join_all;
use pipeline_action_core::archive::read_single_entry;
use pipeline_action_core::artifact_location::resolve_s3_location;
use pipeline_action_core::contract::Artifact;
use serde_json::{json, Value};

use crate::adapters::object_store::ArtifactStore;
use crate::diagnostics::Diagnostics;
use crate::error::ActionError;
use crate::job::{JobInputs, ValidatedJob};
use crate::stages::ActionContext;

/// Fetches and decodes every input artifact concurrently.
///
/// Results keep the order of the job's input artifacts regardless of which
/// fetch finishes first; the first failing fetch fails the whole stage.
pub async fn fetch_inputs(
    job: ValidatedJob,
    context: ActionContext,
) -> Result<JobInputs, ActionError> {
    let diagnostics = context.diagnostics();
    let inputs = try_join_all(
        job.job()
            .input_artifacts()
            .iter()
            .map(|artifact| fetch_artifact(job.store().as_ref(), artifact, diagnostics)),
    )
    .await?;

    Ok(JobInputs { job, inputs })
}

pub async fn fetch_artifact(
    store: &dyn ArtifactStore,
    artifact: &Artifact,
    diagnostics: &Diagnostics,
) -> Result<Value, ActionError> {
    let location = resolve_s3_location(artifact)?;
    let bytes = store
        .get_object(&location.bucket_name, &location.object_key)
        .await
        .map_err(|message| ActionError::Fetch {
            artifact: artifact.name.clone(),
            message,
        })?;

    diagnostics.info(
        "artifact_fetched",
        json!({
            "artifact": artifact.name.clone(),
            "bucket": location.bucket_name.clone(),
            "key": location.object_key.clone(),
            "bytes": bytes.len(),
        }),
    );
    decode_artifact(artifact, &bytes, diagnostics)
}

/// Unpacks the single archive entry and parses it as JSON.
///
/// Parser detail stays in the diagnostics trail; the returned error only names
/// the artifact.
pub fn decode_artifact(
    artifact: &Artifact,
    bytes: &[u8],
    diagnostics: &Diagnostics,
) -> Result<Value, ActionError> {
    let contents = read_single_entry(bytes)
        .map_err(|error| ActionError::from_archive(&artifact.name, error))?;

    serde_json::from_slice(&contents).map_err(|error| {
        diagnostics.info(
            "artifact_decode_failed",
            json!({
                "artifact": artifact.name.clone(),
                "parse_error": error.to_string(),
                "raw_text": String::from_utf8_lossy(&contents),
            }),
        );
        ActionError::InvalidJson {
            artifact: artifact.name.clone(),
        }
    })
}
