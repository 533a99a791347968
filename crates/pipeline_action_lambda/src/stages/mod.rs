//! Built-in pipeline stages and the function types used to override them.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use pipeline_action_core::contract::Job;

use crate::adapters::job_status::JobStatusReporter;
use crate::adapters::object_store::ArtifactStoreFactory;
use crate::diagnostics::Diagnostics;
use crate::error::{ActionError, BoxError};
use crate::job::{JobFailure, JobInputs, JobOutputs, StoredOutputs, ValidatedJob};

pub mod inputs;
pub mod outputs;
pub mod report;
pub mod validate;

pub type StageFuture<T> = BoxFuture<'static, Result<T, ActionError>>;

pub type JobValidatorFn =
    Arc<dyn Fn(Job, &ActionContext) -> Result<ValidatedJob, ActionError> + Send + Sync>;
pub type InputAdapterFn =
    Arc<dyn Fn(ValidatedJob, ActionContext) -> StageFuture<JobInputs> + Send + Sync>;
pub type InputHandlerFn =
    Arc<dyn Fn(JobInputs) -> BoxFuture<'static, Result<JobOutputs, BoxError>> + Send + Sync>;
pub type OutputAdapterFn =
    Arc<dyn Fn(JobOutputs, ActionContext) -> StageFuture<StoredOutputs> + Send + Sync>;
pub type JobCompletionFn =
    Arc<dyn Fn(StoredOutputs, ActionContext) -> StageFuture<()> + Send + Sync>;
pub type JobFailureFn = Arc<dyn Fn(JobFailure, ActionContext) -> StageFuture<()> + Send + Sync>;

/// External collaborators shared by every invocation of a pipeline.
#[derive(Clone)]
pub struct ActionServices {
    pub stores: Arc<dyn ArtifactStoreFactory>,
    pub job_status: Arc<dyn JobStatusReporter>,
    pub diagnostics: Diagnostics,
}

/// Everything a stage may consult besides the value it is handed.
#[derive(Clone)]
pub struct ActionContext {
    pub num_input_artifacts: usize,
    pub num_output_artifacts: usize,
    pub services: ActionServices,
}

impl ActionContext {
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.services.diagnostics
    }
}

pub fn default_job_validator() -> JobValidatorFn {
    Arc::new(validate::validate_job)
}

pub fn default_input_adapter() -> InputAdapterFn {
    Arc::new(|job, context| inputs::fetch_inputs(job, context).boxed())
}

pub fn default_output_adapter() -> OutputAdapterFn {
    Arc::new(|job_outputs, context| outputs::store_outputs(job_outputs, context).boxed())
}

pub fn default_job_completion() -> JobCompletionFn {
    Arc::new(|stored, context| report::report_success(stored, context).boxed())
}

pub fn default_job_failure() -> JobFailureFn {
    Arc::new(|failure, context| report::report_failure(failure, context).boxed())
}
