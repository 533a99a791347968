//! In-memory collaborators for exercising the pipeline without AWS.
//!
//! Shared by the unit tests in this crate and the integration tests under
//! `tests/`. Enabled by default through the `test-helpers` feature.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pipeline_action_core::contract::{ArtifactCredentials, FailureDetails};

use crate::adapters::job_status::JobStatusReporter;
use crate::adapters::object_store::{
    ArtifactStore, ArtifactStoreFactory, PutAcknowledgement, ServerSideEncryption,
};
use crate::diagnostics::Diagnostics;
use crate::stages::ActionServices;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPut {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub encryption: ServerSideEncryption,
}

/// Object store keeping everything in memory.
///
/// Keys can be made to fail or to respond after a delay, and the order in which
/// calls complete is recorded.
#[derive(Default)]
pub struct MemoryArtifactStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    puts: Mutex<Vec<RecordedPut>>,
    completions: Mutex<Vec<String>>,
    failing_keys: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_object(&self, bucket: &str, key: &str, body: &[u8]) {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn fail_key(&self, key: &str) {
        self.failing_keys
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string());
    }

    pub fn delay_key(&self, key: &str, delay: Duration) {
        self.delays
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), delay);
    }

    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().expect("poisoned mutex").clone()
    }

    /// Keys in the order their get or put calls finished.
    pub fn completion_order(&self) -> Vec<String> {
        self.completions.lock().expect("poisoned mutex").clone()
    }

    async fn simulate_latency(&self, key: &str) {
        let delay = self
            .delays
            .lock()
            .expect("poisoned mutex")
            .get(key)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn is_failing(&self, key: &str) -> bool {
        self.failing_keys
            .lock()
            .expect("poisoned mutex")
            .contains(key)
    }

    fn record_completion(&self, key: &str) {
        self.completions
            .lock()
            .expect("poisoned mutex")
            .push(key.to_string());
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        self.simulate_latency(key).await;
        self.record_completion(key);
        if self.is_failing(key) {
            return Err(format!("simulated read failure for key: {key}"));
        }

        self.object(bucket, key)
            .ok_or_else(|| format!("no such object: s3://{bucket}/{key}"))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        encryption: ServerSideEncryption,
    ) -> Result<PutAcknowledgement, String> {
        self.simulate_latency(key).await;
        self.record_completion(key);
        if self.is_failing(key) {
            return Err(format!("simulated write failure for key: {key}"));
        }

        self.seed_object(bucket, key, &body);
        let mut puts = self.puts.lock().expect("poisoned mutex");
        puts.push(RecordedPut {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body,
            encryption,
        });

        Ok(PutAcknowledgement {
            bucket: bucket.to_string(),
            key: key.to_string(),
            e_tag: Some(format!("etag-{}", puts.len())),
            version_id: None,
        })
    }
}

/// Hands out the same in-memory store for every job, remembering which access
/// key ids it was asked to scope a client to.
pub struct SharedStoreFactory {
    store: Arc<MemoryArtifactStore>,
    access_key_ids: Mutex<Vec<String>>,
}

impl SharedStoreFactory {
    pub fn new(store: Arc<MemoryArtifactStore>) -> Self {
        Self {
            store,
            access_key_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn access_key_ids(&self) -> Vec<String> {
        self.access_key_ids.lock().expect("poisoned mutex").clone()
    }
}

impl ArtifactStoreFactory for SharedStoreFactory {
    fn for_credentials(&self, credentials: &ArtifactCredentials) -> Arc<dyn ArtifactStore> {
        self.access_key_ids
            .lock()
            .expect("poisoned mutex")
            .push(credentials.access_key_id.clone());
        self.store.clone()
    }
}

#[derive(Default)]
pub struct RecordingJobStatus {
    successes: Mutex<Vec<String>>,
    failures: Mutex<Vec<(String, FailureDetails)>>,
    reject_reports: bool,
}

impl RecordingJobStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reporter that records every call and then fails it.
    pub fn rejecting() -> Self {
        Self {
            reject_reports: true,
            ..Self::default()
        }
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().expect("poisoned mutex").clone()
    }

    pub fn failures(&self) -> Vec<(String, FailureDetails)> {
        self.failures.lock().expect("poisoned mutex").clone()
    }
}

#[async_trait]
impl JobStatusReporter for RecordingJobStatus {
    async fn put_job_success(&self, job_id: &str) -> Result<(), String> {
        self.successes
            .lock()
            .expect("poisoned mutex")
            .push(job_id.to_string());
        if self.reject_reports {
            return Err("simulated job status outage".to_string());
        }
        Ok(())
    }

    async fn put_job_failure(&self, job_id: &str, details: &FailureDetails) -> Result<(), String> {
        self.failures
            .lock()
            .expect("poisoned mutex")
            .push((job_id.to_string(), details.clone()));
        if self.reject_reports {
            return Err("simulated job status outage".to_string());
        }
        Ok(())
    }
}

/// Collaborators wired to in-memory doubles, plus handles to inspect them.
pub struct TestHarness {
    pub store: Arc<MemoryArtifactStore>,
    pub factory: Arc<SharedStoreFactory>,
    pub job_status: Arc<RecordingJobStatus>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_job_status(RecordingJobStatus::new())
    }

    pub fn with_job_status(job_status: RecordingJobStatus) -> Self {
        let store = Arc::new(MemoryArtifactStore::new());
        Self {
            factory: Arc::new(SharedStoreFactory::new(store.clone())),
            store,
            job_status: Arc::new(job_status),
        }
    }

    pub fn services(&self) -> ActionServices {
        ActionServices {
            stores: self.factory.clone(),
            job_status: self.job_status.clone(),
            diagnostics: Diagnostics::verbose(),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
