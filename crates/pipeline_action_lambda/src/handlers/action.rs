use std::future::Future;

use pipeline_action_core::contract::{Job, JOB_EVENT_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::object_store::PutAcknowledgement;
use crate::error::{ActionError, BoxError, ConfigError};
use crate::handlers::config::{box_input_handler, PipelineConfig, ResolvedStages};
use crate::job::{JobFailure, JobInputs, JobOutputs};
use crate::stages::{ActionContext, ActionServices};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActionSuccessResponse {
    pub status: String,
    pub job_id: String,
    pub stored_artifacts: Vec<PutAcknowledgement>,
}

/// A configured custom action, reusable across invocations.
///
/// The pipeline keeps no per-invocation state: each call to [`invoke`] extracts
/// its own job and threads it through validation, input decoding, the handler,
/// output storage and completion reporting. The first failing stage ends the
/// chain; the failure is reported to the orchestrator once and then returned.
///
/// [`invoke`]: ActionPipeline::invoke
pub struct ActionPipeline {
    stages: ResolvedStages,
    context: ActionContext,
}

impl ActionPipeline {
    pub fn new(config: PipelineConfig, services: ActionServices) -> Result<Self, ConfigError> {
        Ok(Self::build(config.resolve()?, services))
    }

    pub fn from_handler<F, Fut, E>(handler: F, services: ActionServices) -> Self
    where
        F: Fn(JobInputs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<JobOutputs, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        let stages = PipelineConfig::new().resolve_with(box_input_handler(handler));
        Self::build(stages, services)
    }

    fn build(stages: ResolvedStages, services: ActionServices) -> Self {
        let context = ActionContext {
            num_input_artifacts: stages.num_input_artifacts,
            num_output_artifacts: stages.num_output_artifacts,
            services,
        };
        Self { stages, context }
    }

    pub fn context(&self) -> &ActionContext {
        &self.context
    }

    pub async fn invoke(&self, event: Value) -> Result<ActionSuccessResponse, ActionError> {
        let diagnostics = self.context.diagnostics();
        let job = match extract_job(&event) {
            Ok(job) => job,
            Err(error) => {
                diagnostics.error("job_rejected", json!({ "error": error.to_string() }));
                if let Some(job_id) = reportable_job_id(&event) {
                    let job = Job {
                        id: job_id.to_string(),
                        data: None,
                    };
                    self.report_failure(job, &error).await;
                }
                return Err(error);
            }
        };

        diagnostics.info(
            "job_started",
            json!({
                "job_id": job.id.clone(),
                "input_artifacts": job.input_artifacts().len(),
                "output_artifacts": job.output_artifacts().len(),
            }),
        );

        match self.run(job.clone()).await {
            Ok(response) => {
                diagnostics.info(
                    "job_completed",
                    json!({
                        "job_id": response.job_id.clone(),
                        "stored_artifacts": response.stored_artifacts.len(),
                    }),
                );
                Ok(response)
            }
            Err(error) => {
                self.report_failure(job, &error).await;
                Err(error)
            }
        }
    }

    async fn run(&self, job: Job) -> Result<ActionSuccessResponse, ActionError> {
        let stages = &self.stages;
        let context = &self.context;

        let validated = (stages.job_validator)(job, context)?;

        let job_inputs = (stages.input_adapter)(validated, context.clone()).await?;
        if job_inputs.inputs.len() != context.num_input_artifacts {
            return Err(ActionError::InputArity {
                expected: context.num_input_artifacts,
                actual: job_inputs.inputs.len(),
            });
        }

        let job_outputs = (stages.input_handler)(job_inputs)
            .await
            .map_err(ActionError::handler)?;

        let stored = (stages.output_adapter)(job_outputs, context.clone()).await?;
        let response = ActionSuccessResponse {
            status: "ok".to_string(),
            job_id: stored.job.id().to_string(),
            stored_artifacts: stored.acknowledgements.clone(),
        };

        (stages.on_job_completion)(stored, context.clone()).await?;
        Ok(response)
    }

    /// Reports `error` for `job`. A failing report is traced but never replaces
    /// the original error.
    async fn report_failure(&self, job: Job, error: &ActionError) {
        let diagnostics = self.context.diagnostics();
        let job_id = job.id.clone();
        let message = error.to_string();
        diagnostics.error(
            "job_failed",
            json!({ "job_id": job_id.clone(), "error": message.clone() }),
        );

        let failure = JobFailure { job, message };
        if let Err(report_error) = (self.stages.on_job_failure)(failure, self.context.clone()).await
        {
            diagnostics.error(
                "failure_report_failed",
                json!({ "job_id": job_id, "error": report_error.to_string() }),
            );
        }
    }
}

/// Pulls the job description out of an invocation event.
pub fn extract_job(event: &Value) -> Result<Job, ActionError> {
    match event.get(JOB_EVENT_KEY) {
        None | Some(Value::Null) => Err(ActionError::MissingJob { key: JOB_EVENT_KEY }),
        Some(description) => serde_json::from_value(description.clone())
            .map_err(|error| ActionError::MalformedJob(error.to_string())),
    }
}

/// The id of a job description that failed to parse, when it still carries a
/// string `id`. Without one there is nothing to report a failure against.
fn reportable_job_id(event: &Value) -> Option<&str> {
    event.get(JOB_EVENT_KEY)?.get("id")?.as_str()
}
