//! services/api/src/adapters/storage.rs
//!
//! Object storage gateway implementing the `ObjectStorageService` port
//! against a Supabase-style storage REST API. It only signs and downloads;
//! uploads happen in the UI layer and never pass through this service.

use async_trait::async_trait;
use notebook_core::ports::{ObjectStorageService, PortError, PortResult, StoredObject};
use serde::Deserialize;
use serde_json::json;

/// An adapter that issues time-limited signed URLs and downloads objects
/// through them.
#[derive(Clone)]
pub struct StorageAdapter {
    client: reqwest::Client,
    /// Storage API root, e.g. `https://example.com/storage/v1`.
    base_url: String,
    service_key: String,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl StorageAdapter {
    pub fn new(client: reqwest::Client, base_url: String, service_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        }
    }
}

#[async_trait]
impl ObjectStorageService for StorageAdapter {
    async fn create_signed_url(
        &self,
        bucket: &str,
        object_path: &str,
        expires_in_secs: u64,
    ) -> PortResult<String> {
        let endpoint = format!("{}/object/sign/{}/{}", self.base_url, bucket, object_path);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.service_key)
            .json(&json!({ "expiresIn": expires_in_secs }))
            .send()
            .await
            .map_err(|e| PortError::Extraction(format!("failed to create signed URL: {e}")))?;

        if !response.status().is_success() {
            return Err(PortError::Extraction(format!(
                "failed to create signed URL: {} for {bucket}/{object_path}",
                response.status()
            )));
        }

        let signed: SignResponse = response
            .json()
            .await
            .map_err(|e| PortError::Extraction(format!("malformed signing response: {e}")))?;

        // The API returns a path relative to the storage root.
        Ok(format!("{}{}", self.base_url, signed.signed_url))
    }

    async fn download(&self, url: &str) -> PortResult<StoredObject> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Extraction(format!("failed to download file: {e}")))?;

        if !response.status().is_success() {
            return Err(PortError::Extraction(format!(
                "failed to download file: {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortError::Extraction(format!("failed to read file body: {e}")))?;

        Ok(StoredObject {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
