#![allow(dead_code)]

use pipeline_action_core::archive::{read_single_entry, write_archive};
use pipeline_action_lambda::test_support::MemoryArtifactStore;
use serde_json::{json, Value};

pub const JOB_ID: &str = "11111111-2222-3333-4444-555555555555";
pub const BUCKET: &str = "codepipeline-artifacts";
pub const ACCESS_KEY_ID: &str = "ASIAEXAMPLEKEY";

/// An artifact slot in a job description, stored at `BUCKET/key`.
#[derive(Clone, Copy, Debug)]
pub struct ArtifactSlot<'a> {
    pub name: &'a str,
    pub key: &'a str,
}

pub fn slot<'a>(name: &'a str, key: &'a str) -> ArtifactSlot<'a> {
    ArtifactSlot { name, key }
}

fn artifact_json(slot: &ArtifactSlot<'_>) -> Value {
    json!({
        "name": slot.name,
        "revision": null,
        "location": {
            "type": "S3",
            "s3Location": {"bucketName": BUCKET, "objectKey": slot.key}
        }
    })
}

/// A job description shaped like the ones the orchestrator sends.
pub fn job_json(inputs: &[ArtifactSlot<'_>], outputs: &[ArtifactSlot<'_>]) -> Value {
    json!({
        "id": JOB_ID,
        "accountId": "123456789012",
        "data": {
            "actionConfiguration": {"configuration": {"FunctionName": "pipeline-action"}},
            "inputArtifacts": inputs.iter().map(artifact_json).collect::<Vec<_>>(),
            "outputArtifacts": outputs.iter().map(artifact_json).collect::<Vec<_>>(),
            "artifactCredentials": {
                "accessKeyId": ACCESS_KEY_ID,
                "secretAccessKey": "secret",
                "sessionToken": "token"
            }
        }
    })
}

pub fn job_event(inputs: &[ArtifactSlot<'_>], outputs: &[ArtifactSlot<'_>]) -> Value {
    json!({ "CodePipeline.job": job_json(inputs, outputs) })
}

/// Stores `document` as a single-entry zip, the way an upstream action would.
pub fn seed_json_artifact(store: &MemoryArtifactStore, key: &str, document: &Value) {
    let text = document.to_string();
    let bytes = write_archive(&[("input.json", text.as_bytes())]).expect("archive should build");
    store.seed_object(BUCKET, key, &bytes);
}

pub fn stored_json(store: &MemoryArtifactStore, key: &str) -> Value {
    let bytes = store.object(BUCKET, key).expect("object should be stored");
    let contents = read_single_entry(&bytes).expect("stored artifact should hold one entry");
    serde_json::from_slice(&contents).expect("stored entry should be JSON")
}
