use super::client::StabilityHttpClient;
use super::types::{FinishReason, TextPrompt, TextToImageRequest, TextToImageResponse};
use crate::ai::ImageGenerationService;
use crate::models::ImageParams;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Longest prompt the v1 endpoint accepts.
const MAX_PROMPT_CHARS: usize = 2000;

pub struct StabilityImageClient {
    http: StabilityHttpClient,
    params: ImageParams,
}

impl StabilityImageClient {
    pub fn new(api_key: String, engine: String, params: ImageParams) -> Self {
        Self::new_with_client(api_key, engine, params, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        engine: String,
        params: ImageParams,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: StabilityHttpClient::new_with_client(
                api_key,
                engine,
                Duration::from_secs(120),
                client,
            ),
            params,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn build_request(&self, prompt: &str) -> TextToImageRequest {
        let text = if prompt.chars().count() > MAX_PROMPT_CHARS {
            tracing::warn!(
                "Image prompt is {} chars, truncating to {}",
                prompt.chars().count(),
                MAX_PROMPT_CHARS
            );
            prompt.chars().take(MAX_PROMPT_CHARS).collect()
        } else {
            prompt.to_string()
        };

        TextToImageRequest {
            text_prompts: vec![TextPrompt { text, weight: 1.0 }],
            cfg_scale: self.params.cfg_scale,
            height: self.params.height,
            width: self.params.width,
            steps: self.params.steps,
            samples: self.params.samples,
        }
    }

    /// Walk artifacts in order: a filtered artifact aborts, the first image wins.
    fn extract_image(response: TextToImageResponse) -> Result<Vec<u8>> {
        for artifact in response.artifacts {
            match artifact.finish_reason {
                Some(FinishReason::ContentFiltered) => {
                    tracing::error!("Stability safety filter rejected the image");
                    return Err(Error::ContentFiltered);
                }
                Some(FinishReason::Error) => {
                    tracing::warn!("Skipping Stability artifact that finished with ERROR");
                    continue;
                }
                _ => {}
            }

            if let Some(b64) = artifact.base64 {
                tracing::debug!("Stability returned artifact (seed: {:?})", artifact.seed);
                use base64::Engine as _;
                return base64::engine::general_purpose::STANDARD
                    .decode(b64.trim())
                    .map_err(|e| {
                        Error::AiProvider(format!("Failed to decode Stability base64 image: {}", e))
                    });
            }
        }

        Err(Error::AiProvider(
            "No image artifact in Stability response".to_string(),
        ))
    }
}

#[async_trait]
impl ImageGenerationService for StabilityImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let request = self.build_request(prompt);
        let response = self.http.text_to_image(&request).await?;

        let bytes = Self::extract_image(response)?;
        tracing::info!(
            "Image generated successfully ({} bytes, engine: {})",
            bytes.len(),
            self.http.engine()
        );
        Ok(bytes)
    }
}
