//! AI service integration for poem and image generation
//!
//! Text generation goes through Gemini or OpenAI; images come from Stability AI's
//! text-to-image endpoint. Both sit behind traits so the pipeline can run
//! against mocks.

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod stability;

pub use gemini::GeminiTextClient;
pub use mock::{MockImageGenerationClient, MockTextClient};
pub use openai::OpenAiTextClient;
pub use stability::StabilityImageClient;

use crate::{prompts, Error, Result};
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Send a single prompt and return the raw generated text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    async fn generate_poem(&self, seed: &str) -> Result<String> {
        let text = self
            .complete(&prompts::render(prompts::POEM, &[("seed", seed)]))
            .await?;
        non_empty(text, "poem")
    }

    async fn generate_image_prompt(&self, poem: &str) -> Result<String> {
        let text = self
            .complete(&prompts::render(prompts::IMAGE_PROMPT, &[("poem", poem)]))
            .await?;
        non_empty(text, "image prompt")
    }

    /// Poem first, then the image prompt derived from it. An empty poem stops
    /// before the second request.
    async fn generate_poem_and_image_prompt(&self, seed: &str) -> Result<(String, String)> {
        let poem = self.generate_poem(seed).await?;
        tracing::info!("Generated poem:\n{}", poem);

        let image_prompt = self.generate_image_prompt(&poem).await?;
        tracing::info!("Generated image prompt: {}", image_prompt);

        Ok((poem, image_prompt))
    }
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}

fn non_empty(text: String, field: &'static str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        tracing::error!("Text service returned an empty {}", field);
        return Err(Error::EmptyGeneration(field));
    }
    Ok(trimmed.to_string())
}
