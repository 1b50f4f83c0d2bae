// OpenAI Moderation API implementation.
//
// POST {base_url}/moderations with `{ model, input }` and a bearer token.
// The response carries a `results` array; the gateway only ever sends a
// single input string, so at most one entry is expected.
//
// API docs: https://platform.openai.com/docs/api-reference/moderations

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ModerationResult, ModerationService, UpstreamError};

/// OpenAI Moderation API client.
pub struct OpenAiModerator {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiModerator {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`).
    ///
    /// `timeout` of `None` keeps reqwest's default, which never times out.
    pub fn new(api_key: String, base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("moderation-gateway/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModerationService for OpenAiModerator {
    async fn classify(
        &self,
        model: &str,
        input: &str,
    ) -> Result<Vec<ModerationResult>, UpstreamError> {
        let url = format!("{}/moderations", self.base_url);
        let request = ModerationsRequest { model, input };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_send_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Api { status, body });
        }

        // Headers arrived; the body can still stall or be cut off mid-stream.
        let body = response.bytes().await.map_err(|err| UpstreamError::Transport {
            reason: format!("failed reading response body: {err}"),
        })?;
        let parsed: ModerationsResponse = serde_json::from_slice(&body)
            .context("Failed to parse Moderation API response")?;

        debug!(
            model = %parsed.model.as_deref().unwrap_or(model),
            results = parsed.results.len(),
            "Moderation API responded"
        );

        Ok(parsed.results)
    }
}

/// Split reqwest send failures into "could not reach the service" and
/// everything else.
fn classify_send_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() || err.is_connect() || err.is_request() || err.is_body() {
        UpstreamError::Transport {
            reason: err.to_string(),
        }
    } else {
        UpstreamError::Other(anyhow::Error::new(err).context("Moderation API request failed"))
    }
}

// --- OpenAI request/response types ---

#[derive(Serialize)]
struct ModerationsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct ModerationsResponse {
    #[serde(default)]
    model: Option<String>,
    results: Vec<ModerationResult>,
}
