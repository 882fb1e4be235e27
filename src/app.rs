//! Pipeline orchestration: seed, poem, image prompt, image, persistence.

use crate::ai::{
    GeminiTextClient, ImageGenerationService, OpenAiTextClient, StabilityImageClient,
    TextGenerationService,
};
use crate::models::{Config, DreamRecord, SeedMode, TextProvider};
use crate::seeds::{SeedSelector, SeedSource};
use crate::storage::{image_file_name, DreamStore, LocalDreamStore, MemoryDreamStore};
use crate::Result;
use chrono::{DateTime, Utc};
use tracing::info;

/// Runs one dream generation end to end. Any failure aborts the run.
pub struct App {
    text: Box<dyn TextGenerationService>,
    image_gen: Box<dyn ImageGenerationService>,
    store: Box<dyn DreamStore>,
    seeds: SeedSource,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub text: Box<dyn TextGenerationService>,
    pub image_gen: Box<dyn ImageGenerationService>,
    pub store: Box<dyn DreamStore>,
    pub seeds: SeedSource,
}

impl App {
    pub fn with_services(services: AppServices) -> Self {
        Self {
            text: services.text,
            image_gen: services.image_gen,
            store: services.store,
            seeds: services.seeds,
        }
    }

    /// Construct an app from an explicit configuration.
    pub fn new(config: &Config) -> Result<Self> {
        // One connection pool shared by the text and image clients.
        let http_client = reqwest::Client::new();

        let text: Box<dyn TextGenerationService> = match config.text_provider {
            TextProvider::Gemini => {
                info!("Text provider: Gemini (model: {})", config.text_model);
                Box::new(GeminiTextClient::new_with_client(
                    config.text_api_key.clone(),
                    config.text_model.clone(),
                    http_client.clone(),
                ))
            }
            TextProvider::OpenAi => {
                info!("Text provider: OpenAI (model: {})", config.text_model);
                Box::new(OpenAiTextClient::new_with_client(
                    config.text_api_key.clone(),
                    config.text_model.clone(),
                    http_client.clone(),
                ))
            }
        };

        info!("Image provider: Stability (engine: {})", config.stability_engine);
        let image_gen = Box::new(StabilityImageClient::new_with_client(
            config.stability_api_key.clone(),
            config.stability_engine.clone(),
            config.image_params.clone(),
            http_client,
        ));

        let store: Box<dyn DreamStore> = if config.dry_run {
            info!("DRY_RUN enabled, nothing will be written to disk");
            Box::new(
                MemoryDreamStore::new()
                    .with_image_dir(config.image_dir.to_string_lossy().into_owned()),
            )
        } else {
            Box::new(LocalDreamStore::new(
                config.dreams_json.clone(),
                config.image_dir.clone(),
            ))
        };

        let seeds = match (&config.fixed_seed, config.seed_mode, &config.seed_lists_dir) {
            (Some(seed), _, _) => SeedSource::Fixed(seed.clone()),
            (None, SeedMode::Classic, _) => SeedSource::Classic,
            (None, SeedMode::Composed, Some(dir)) => {
                SeedSource::Composed(SeedSelector::from_files(dir)?)
            }
            (None, SeedMode::Composed, None) => SeedSource::Composed(SeedSelector::builtin()?),
        };

        Ok(Self::with_services(AppServices {
            text,
            image_gen,
            store,
            seeds,
        }))
    }

    /// Run the pipeline. The record is stamped once generation has succeeded.
    pub async fn run(&self) -> Result<DreamRecord> {
        let dream = self.generate().await?;
        self.persist(Utc::now(), dream)
    }

    /// Run the pipeline, stamping the image file and record with `timestamp`.
    pub async fn run_at(&self, timestamp: DateTime<Utc>) -> Result<DreamRecord> {
        let dream = self.generate().await?;
        self.persist(timestamp, dream)
    }

    async fn generate(&self) -> Result<GeneratedDream> {
        info!("The Skald is waking...");

        let seed = self.seeds.next_seed();
        info!("Seed: {}", seed);

        let (poem, image_prompt) = self.text.generate_poem_and_image_prompt(&seed).await?;

        let image_data = self.image_gen.generate_image(&image_prompt).await?;
        let png = crate::image::ensure_png(&image_data)?;

        Ok(GeneratedDream { seed, poem, png })
    }

    fn persist(&self, timestamp: DateTime<Utc>, dream: GeneratedDream) -> Result<DreamRecord> {
        // A log we cannot rewrite must fail the run before any image lands on disk.
        self.store.load_log()?;

        let image_url = self.store.save_image(&image_file_name(timestamp), &dream.png)?;
        let record = DreamRecord::new(timestamp, dream.seed, &dream.poem, image_url);
        let total = self.store.append_record(record.clone())?;

        info!(
            "A new dream has been recorded ({} in the log). The Skald sleeps again.",
            total
        );
        Ok(record)
    }
}

struct GeneratedDream {
    seed: String,
    poem: String,
    png: Vec<u8>,
}
