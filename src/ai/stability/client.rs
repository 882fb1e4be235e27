use super::types::{TextToImageRequest, TextToImageResponse};
use crate::{Error, Result};
use reqwest::Client;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.stability.ai";

pub struct StabilityHttpClient {
    client: Client,
    api_key: String,
    engine: String,
    base_url: String,
    timeout: Duration,
}

impl StabilityHttpClient {
    pub fn new_with_client(
        api_key: String,
        engine: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            engine,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Calls `/v1/generation/{engine}/text-to-image` and returns the decoded envelope.
    pub async fn text_to_image(&self, request: &TextToImageRequest) -> Result<TextToImageResponse> {
        let url = format!(
            "{}/v1/generation/{}/text-to-image",
            self.base_url, self.engine
        );
        tracing::debug!(
            "Sending text-to-image request to Stability ({}, {}x{}, {} steps)",
            self.engine,
            request.width,
            request.height,
            request.steps
        );

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Stability: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Stability API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Stability API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Stability response: {}", e);
            Error::AiProvider(format!("Failed to parse Stability response: {}", e))
        })
    }
}
