use futures::future::try_join_all;
use pipeline_action_core::archive::encode_json_artifact;
use pipeline_action_core::artifact_location::resolve_s3_location;
use pipeline_action_core::contract::Artifact;
use serde_json::{json, Value};

use crate::adapters::object_store::{ArtifactStore, PutAcknowledgement, ServerSideEncryption};
use crate::diagnostics::Diagnostics;
use crate::error::ActionError;
use crate::job::{JobOutputs, StoredOutputs};
use crate::stages::ActionContext;

/// Stores each output value in the output artifact at the same position.
///
/// The value count must match the job's output artifacts exactly; a mismatch
/// fails before any store is attempted.
pub async fn store_outputs(
    job_outputs: JobOutputs,
    context: ActionContext,
) -> Result<StoredOutputs, ActionError> {
    let JobOutputs { job, outputs } = job_outputs;
    let artifacts = job.job().output_artifacts();
    if outputs.len() != artifacts.len() {
        return Err(ActionError::OutputArity {
            expected: artifacts.len(),
            actual: outputs.len(),
        });
    }

    let diagnostics = context.diagnostics();
    let acknowledgements = try_join_all(
        artifacts
            .iter()
            .zip(outputs.iter())
            .map(|(artifact, value)| {
                store_artifact(job.store().as_ref(), artifact, value, diagnostics)
            }),
    )
    .await?;

    Ok(StoredOutputs {
        job,
        acknowledgements,
    })
}

pub async fn store_artifact(
    store: &dyn ArtifactStore,
    artifact: &Artifact,
    value: &Value,
    diagnostics: &Diagnostics,
) -> Result<PutAcknowledgement, ActionError> {
    let location = resolve_s3_location(artifact)?;
    let body = encode_json_artifact(value)
        .map_err(|error| ActionError::from_archive(&artifact.name, error))?;
    let size = body.len();

    let acknowledgement = store
        .put_object(
            &location.bucket_name,
            &location.object_key,
            body,
            ServerSideEncryption::Kms,
        )
        .await
        .map_err(|message| ActionError::Store {
            artifact: artifact.name.clone(),
            message,
        })?;

    diagnostics.info(
        "artifact_stored",
        json!({
            "artifact": artifact.name.clone(),
            "bucket": location.bucket_name.clone(),
            "key": location.object_key.clone(),
            "bytes": size,
        }),
    );
    Ok(acknowledgement)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pipeline_action_core::archive::read_single_entry;
    use pipeline_action_core::contract::Job;

    use super::*;
    use crate::job::ValidatedJob;
    use crate::test_support::TestHarness;

    fn artifact(name: &str) -> Value {
        json!({
            "name": name,
            "location": {
                "type": "S3",
                "s3Location": {"bucketName": "artifacts", "objectKey": format!("{name}.zip")}
            }
        })
    }

    fn job_with_outputs(harness: &TestHarness, outputs: Vec<Value>) -> ValidatedJob {
        let job: Job = serde_json::from_value(json!({
            "id": "job-9",
            "data": {"inputArtifacts": [], "outputArtifacts": outputs}
        }))
        .expect("job fixture should parse");
        let store: Arc<dyn ArtifactStore> = harness.store.clone();
        ValidatedJob::new(job, store)
    }

    fn context(harness: &TestHarness, outputs: usize) -> ActionContext {
        ActionContext {
            num_input_artifacts: 0,
            num_output_artifacts: outputs,
            services: harness.services(),
        }
    }

    #[tokio::test]
    async fn stores_each_value_as_encrypted_single_entry_archive() {
        let harness = TestHarness::new();
        let job = job_with_outputs(&harness, vec![artifact("Plan"), artifact("Report")]);

        let stored = store_outputs(
            JobOutputs::new(job, vec![json!({"plan": true}), json!([1, 2, 3])]),
            context(&harness, 2),
        )
        .await
        .expect("outputs should store");

        let keys: Vec<String> = stored
            .acknowledgements
            .iter()
            .map(|ack| ack.key.clone())
            .collect();
        assert_eq!(keys, vec!["Plan.zip".to_string(), "Report.zip".to_string()]);

        let puts = harness.store.puts();
        assert_eq!(puts.len(), 2);
        assert!(puts
            .iter()
            .all(|put| put.encryption == ServerSideEncryption::Kms && put.bucket == "artifacts"));

        let report = harness
            .store
            .object("artifacts", "Report.zip")
            .expect("report should be stored");
        let contents = read_single_entry(&report).expect("single entry");
        assert_eq!(
            serde_json::from_slice::<Value>(&contents).expect("json"),
            json!([1, 2, 3])
        );
    }

    #[tokio::test]
    async fn arity_mismatch_fails_without_storing() {
        let harness = TestHarness::new();
        let job = job_with_outputs(&harness, vec![artifact("Plan"), artifact("Report")]);

        let error = store_outputs(
            JobOutputs::new(job, vec![json!({"plan": true})]),
            context(&harness, 2),
        )
        .await
        .expect_err("one value for two artifacts");

        assert_eq!(
            error.to_string(),
            "expected 2 output values but received 1"
        );
        assert!(harness.store.completion_order().is_empty());
    }

    #[tokio::test]
    async fn first_failing_store_fails_the_stage() {
        let harness = TestHarness::new();
        harness.store.fail_key("Report.zip");
        harness
            .store
            .delay_key("Plan.zip", Duration::from_millis(20));
        let job = job_with_outputs(&harness, vec![artifact("Plan"), artifact("Report")]);

        let error = store_outputs(
            JobOutputs::new(job, vec![json!(1), json!(2)]),
            context(&harness, 2),
        )
        .await
        .expect_err("report store fails");

        assert!(matches!(error, ActionError::Store { ref artifact, .. } if artifact == "Report"));
        assert!(error
            .to_string()
            .contains("simulated write failure for key: Report.zip"));
    }

    #[tokio::test]
    async fn rejects_unsupported_output_location() {
        let harness = TestHarness::new();
        let mut plan = artifact("Plan");
        plan["location"]["type"] = json!("Artifactory");
        let job = job_with_outputs(&harness, vec![plan]);

        let error = store_outputs(JobOutputs::new(job, vec![json!(1)]), context(&harness, 1))
            .await
            .expect_err("unsupported location");

        assert!(error.to_string().contains("'Plan'"));
        assert!(harness.store.puts().is_empty());
    }
}
