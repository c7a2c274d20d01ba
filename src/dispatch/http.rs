// SPDX-License-Identifier: MIT
//! HTTP transport for an Ollama-compatible generate endpoint.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::{DispatchError, ModelTransport};
use crate::config::EndpointConfig;

/// Talks to `POST {base_url}/api/generate` with `stream: false`.
///
/// No authentication, no retry, no streaming: the full response body is
/// awaited before processing. A hung endpoint is bounded only by the
/// client-side request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl HttpTransport {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout())
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/api/generate", endpoint.base_url.trim_end_matches('/')),
            model: endpoint.model.clone(),
        })
    }
}

#[async_trait]
impl ModelTransport for HttpTransport {
    async fn generate(&self, prompt: &str) -> Result<String, DispatchError> {
        debug!(url = %self.url, model = %self.model, "sending generate request");
        let resp = self
            .client
            .post(&self.url)
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.text().await?)
    }
}
