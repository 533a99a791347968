use std::sync::Arc;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_codepipeline::types::{
    FailureDetails as CodePipelineFailureDetails, FailureType as CodePipelineFailureType,
};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use pipeline_action_core::contract::{ArtifactCredentials, FailureDetails, FailureType};

use crate::adapters::job_status::JobStatusReporter;
use crate::adapters::object_store::{
    ArtifactStore, ArtifactStoreFactory, PutAcknowledgement, ServerSideEncryption,
};

const JOB_CREDENTIALS_PROVIDER: &str = "codepipeline-job-credentials";

pub struct S3ArtifactStore {
    s3_client: aws_sdk_s3::Client,
}

impl S3ArtifactStore {
    pub fn new(s3_client: aws_sdk_s3::Client) -> Self {
        Self { s3_client }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        let output = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|error| format!("failed to read object from s3: {error}"))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|error| format!("failed to read object body from s3: {error}"))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        encryption: ServerSideEncryption,
    ) -> Result<PutAcknowledgement, String> {
        let sse = match encryption {
            ServerSideEncryption::Kms => aws_sdk_s3::types::ServerSideEncryption::AwsKms,
        };

        let output = self
            .s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .server_side_encryption(sse)
            .send()
            .await
            .map_err(|error| format!("failed to write object to s3: {error}"))?;

        Ok(PutAcknowledgement {
            bucket: bucket.to_string(),
            key: key.to_string(),
            e_tag: output.e_tag().map(str::to_string),
            version_id: output.version_id().map(str::to_string),
        })
    }
}

/// Creates S3 clients signed (SigV4) with a job's temporary artifact credentials.
///
/// Region, retry and HTTP settings come from the shared SDK config; only the
/// credentials provider is replaced.
pub struct S3StoreFactory {
    sdk_config: SdkConfig,
}

impl S3StoreFactory {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            sdk_config: sdk_config.clone(),
        }
    }
}

impl ArtifactStoreFactory for S3StoreFactory {
    fn for_credentials(&self, credentials: &ArtifactCredentials) -> Arc<dyn ArtifactStore> {
        let job_credentials = Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            Some(credentials.session_token.clone()),
            None,
            JOB_CREDENTIALS_PROVIDER,
        );
        let s3_config = aws_sdk_s3::config::Builder::from(&self.sdk_config)
            .credentials_provider(job_credentials)
            .build();

        Arc::new(S3ArtifactStore::new(aws_sdk_s3::Client::from_conf(s3_config)))
    }
}

pub struct CodePipelineJobStatus {
    codepipeline_client: aws_sdk_codepipeline::Client,
}

impl CodePipelineJobStatus {
    pub fn new(codepipeline_client: aws_sdk_codepipeline::Client) -> Self {
        Self {
            codepipeline_client,
        }
    }
}

#[async_trait]
impl JobStatusReporter for CodePipelineJobStatus {
    async fn put_job_success(&self, job_id: &str) -> Result<(), String> {
        self.codepipeline_client
            .put_job_success_result()
            .job_id(job_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|error| format!("failed to report job success: {error}"))
    }

    async fn put_job_failure(&self, job_id: &str, details: &FailureDetails) -> Result<(), String> {
        let failure_type = match details.failure_type {
            FailureType::JobFailed => CodePipelineFailureType::JobFailed,
        };
        let failure_details = CodePipelineFailureDetails::builder()
            .r#type(failure_type)
            .message(details.message.clone())
            .build()
            .map_err(|error| format!("invalid job failure details: {error}"))?;

        self.codepipeline_client
            .put_job_failure_result()
            .job_id(job_id)
            .failure_details(failure_details)
            .send()
            .await
            .map(|_| ())
            .map_err(|error| format!("failed to report job failure: {error}"))
    }
}
