use std::sync::Arc;

use async_trait::async_trait;
use pipeline_action_core::contract::ArtifactCredentials;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerSideEncryption {
    Kms,
}

/// Acknowledgement returned by the object store for a stored artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PutAcknowledgement {
    pub bucket: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        encryption: ServerSideEncryption,
    ) -> Result<PutAcknowledgement, String>;
}

/// Builds a store client scoped to one job's temporary credentials.
pub trait ArtifactStoreFactory: Send + Sync {
    fn for_credentials(&self, credentials: &ArtifactCredentials) -> Arc<dyn ArtifactStore>;
}
