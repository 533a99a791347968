use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use pipeline_action_core::contract::{
    Job, DEFAULT_NUM_INPUT_ARTIFACTS, DEFAULT_NUM_OUTPUT_ARTIFACTS,
};

use crate::error::{ActionError, BoxError, ConfigError};
use crate::job::{JobFailure, JobInputs, JobOutputs, StoredOutputs, ValidatedJob};
use crate::stages::{
    default_input_adapter, default_job_completion, default_job_failure, default_job_validator,
    default_output_adapter, ActionContext, InputAdapterFn, InputHandlerFn, JobCompletionFn,
    JobFailureFn, JobValidatorFn, OutputAdapterFn,
};

/// Options recognised when building an action pipeline.
///
/// Only the input handler is required. Every other stage falls back to the
/// built-in implementation and both artifact counts default to one.
#[derive(Clone, Default)]
pub struct PipelineConfig {
    input_handler: Option<InputHandlerFn>,
    job_validator: Option<JobValidatorFn>,
    input_adapter: Option<InputAdapterFn>,
    output_adapter: Option<OutputAdapterFn>,
    on_job_completion: Option<JobCompletionFn>,
    on_job_failure: Option<JobFailureFn>,
    num_input_artifacts: Option<usize>,
    num_output_artifacts: Option<usize>,
}

/// A configuration with every default applied.
#[derive(Clone)]
pub struct ResolvedStages {
    pub input_handler: InputHandlerFn,
    pub job_validator: JobValidatorFn,
    pub input_adapter: InputAdapterFn,
    pub output_adapter: OutputAdapterFn,
    pub on_job_completion: JobCompletionFn,
    pub on_job_failure: JobFailureFn,
    pub num_input_artifacts: usize,
    pub num_output_artifacts: usize,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a bare handler as a configuration with nothing else set.
    pub fn from_handler<F, Fut, E>(handler: F) -> Self
    where
        F: Fn(JobInputs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<JobOutputs, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::new().input_handler(handler)
    }

    pub fn input_handler<F, Fut, E>(mut self, handler: F) -> Self
    where
        F: Fn(JobInputs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<JobOutputs, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        self.input_handler = Some(box_input_handler(handler));
        self
    }

    pub fn job_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(Job, &ActionContext) -> Result<ValidatedJob, ActionError> + Send + Sync + 'static,
    {
        self.job_validator = Some(Arc::new(validator));
        self
    }

    pub fn input_adapter<F, Fut>(mut self, adapter: F) -> Self
    where
        F: Fn(ValidatedJob, ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<JobInputs, ActionError>> + Send + 'static,
    {
        self.input_adapter = Some(Arc::new(move |job, context| adapter(job, context).boxed()));
        self
    }

    pub fn output_adapter<F, Fut>(mut self, adapter: F) -> Self
    where
        F: Fn(JobOutputs, ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StoredOutputs, ActionError>> + Send + 'static,
    {
        self.output_adapter = Some(Arc::new(move |outputs, context| {
            adapter(outputs, context).boxed()
        }));
        self
    }

    pub fn on_job_completion<F, Fut>(mut self, reporter: F) -> Self
    where
        F: Fn(StoredOutputs, ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        self.on_job_completion = Some(Arc::new(move |stored, context| {
            reporter(stored, context).boxed()
        }));
        self
    }

    pub fn on_job_failure<F, Fut>(mut self, reporter: F) -> Self
    where
        F: Fn(JobFailure, ActionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        self.on_job_failure = Some(Arc::new(move |failure, context| {
            reporter(failure, context).boxed()
        }));
        self
    }

    pub fn num_input_artifacts(mut self, count: usize) -> Self {
        self.num_input_artifacts = Some(count);
        self
    }

    pub fn num_output_artifacts(mut self, count: usize) -> Self {
        self.num_output_artifacts = Some(count);
        self
    }

    /// Applies defaults to every unset option.
    pub fn resolve(mut self) -> Result<ResolvedStages, ConfigError> {
        let input_handler = self
            .input_handler
            .take()
            .ok_or(ConfigError::MissingInputHandler)?;
        Ok(self.resolve_with(input_handler))
    }

    pub(crate) fn resolve_with(self, input_handler: InputHandlerFn) -> ResolvedStages {
        ResolvedStages {
            input_handler,
            job_validator: self.job_validator.unwrap_or_else(default_job_validator),
            input_adapter: self.input_adapter.unwrap_or_else(default_input_adapter),
            output_adapter: self.output_adapter.unwrap_or_else(default_output_adapter),
            on_job_completion: self.on_job_completion.unwrap_or_else(default_job_completion),
            on_job_failure: self.on_job_failure.unwrap_or_else(default_job_failure),
            num_input_artifacts: self
                .num_input_artifacts
                .unwrap_or(DEFAULT_NUM_INPUT_ARTIFACTS),
            num_output_artifacts: self
                .num_output_artifacts
                .unwrap_or(DEFAULT_NUM_OUTPUT_ARTIFACTS),
        }
    }
}

pub(crate) fn box_input_handler<F, Fut, E>(handler: F) -> InputHandlerFn
where
    F: Fn(JobInputs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<JobOutputs, E>> + Send + 'static,
    E: Into<BoxError> + 'static,
{
    Arc::new(move |inputs| {
        handler(inputs)
            .map(|result| result.map_err(Into::<BoxError>::into))
            .boxed()
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    async fn echo(inputs: JobInputs) -> Result<JobOutputs, ActionError> {
        Ok(JobOutputs::new(inputs.job, inputs.inputs))
    }

    #[test]
    fn configuration_without_handler_is_rejected() {
        let error = PipelineConfig::new()
            .num_input_artifacts(2)
            .resolve()
            .err()
            .expect("missing handler should fail");

        assert!(matches!(error, ConfigError::MissingInputHandler));
        assert_eq!(
            error.to_string(),
            "pipeline configuration requires an input handler"
        );
    }

    #[test]
    fn bare_handler_resolves_with_default_counts() {
        let resolved = PipelineConfig::from_handler(echo)
            .resolve()
            .expect("handler-only config should resolve");

        assert_eq!(resolved.num_input_artifacts, 1);
        assert_eq!(resolved.num_output_artifacts, 1);
    }

    #[test]
    fn explicit_counts_override_defaults() {
        let resolved = PipelineConfig::new()
            .input_handler(echo)
            .num_input_artifacts(3)
            .num_output_artifacts(0)
            .resolve()
            .expect("config should resolve");

        assert_eq!(resolved.num_input_artifacts, 3);
        assert_eq!(resolved.num_output_artifacts, 0);
    }

    #[test]
    fn handler_accepts_string_errors() {
        let config = PipelineConfig::from_handler(|_inputs: JobInputs| async {
            Err::<JobOutputs, _>(format!("bad input {}", json!({"a": 1})))
        });
        assert!(config.resolve().is_ok());
    }
}
