//! services/api/src/adapters/page_reader.rs
//!
//! Implements the `PageReaderService` port against a Jina-style
//! "read this URL as text" proxy.

use async_trait::async_trait;
use notebook_core::ports::{PageReaderService, PortError, PortResult};

/// An adapter that fetches a web page as plain text through a reader proxy.
#[derive(Clone)]
pub struct ReaderProxyAdapter {
    client: reqwest::Client,
    /// Proxy root, e.g. `https://r.jina.ai`.
    base_url: String,
}

impl ReaderProxyAdapter {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PageReaderService for ReaderProxyAdapter {
    async fn read_page(&self, url: &str) -> PortResult<String> {
        let proxied = format!("{}/{}", self.base_url, url);

        let response = self
            .client
            .get(&proxied)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| PortError::Extraction(format!("failed to fetch website content: {e}")))?;

        if !response.status().is_success() {
            return Err(PortError::Extraction(format!(
                "page reader request failed: {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PortError::Extraction(format!("malformed page reader response: {e}")))?;

        // The proxy nests the text under `data.content` or, for older
        // deployments, at the top level.
        let content = body
            .get("data")
            .and_then(|d| d.get("content"))
            .or_else(|| body.get("content"))
            .and_then(|c| c.as_str());

        match content {
            Some(text) => Ok(text.to_string()),
            None => Err(PortError::Extraction(
                "no content returned by page reader".to_string(),
            )),
        }
    }
}
