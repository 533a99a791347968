//! Values threaded between pipeline stages.
//!
//! Each stage hands the next one an owned value: the validator produces a
//! [`ValidatedJob`], the input adapter [`JobInputs`], the handler [`JobOutputs`]
//! and the output adapter [`StoredOutputs`].

use std::sync::Arc;

use pipeline_action_core::contract::Job;
use serde_json::Value;

use crate::adapters::object_store::{ArtifactStore, PutAcknowledgement};

/// A job that passed validation, paired with a store scoped to its credentials.
#[derive(Clone)]
pub struct ValidatedJob {
    job: Job,
    store: Arc<dyn ArtifactStore>,
}

impl ValidatedJob {
    pub fn new(job: Job, store: Arc<dyn ArtifactStore>) -> Self {
        Self { job, store }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn id(&self) -> &str {
        &self.job.id
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    pub fn into_job(self) -> Job {
        self.job
    }
}

impl std::fmt::Debug for ValidatedJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedJob")
            .field("job", &self.job)
            .finish_non_exhaustive()
    }
}

/// Decoded inputs, index-aligned with the job's input artifacts.
#[derive(Debug, Clone)]
pub struct JobInputs {
    pub job: ValidatedJob,
    pub inputs: Vec<Value>,
}

/// Handler results, one value per output artifact in artifact order.
#[derive(Debug, Clone)]
pub struct JobOutputs {
    pub job: ValidatedJob,
    pub outputs: Vec<Value>,
}

impl JobOutputs {
    pub fn new(job: ValidatedJob, outputs: Vec<Value>) -> Self {
        Self { job, outputs }
    }
}

#[derive(Debug, Clone)]
pub struct StoredOutputs {
    pub job: ValidatedJob,
    pub acknowledgements: Vec<PutAcknowledgement>,
}

/// The original job and the message of the error that ended it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub job: Job,
    pub message: String,
}
