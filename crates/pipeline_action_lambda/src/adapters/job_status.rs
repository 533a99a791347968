use async_trait::async_trait;
use pipeline_action_core::contract::FailureDetails;

#[async_trait]
pub trait JobStatusReporter: Send + Sync {
    async fn put_job_success(&self, job_id: &str) -> Result<(), String>;

    async fn put_job_failure(&self, job_id: &str, details: &FailureDetails) -> Result<(), String>;
}
