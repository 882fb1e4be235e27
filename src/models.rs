//! Data models and structures
//!
//! Defines the persisted dream log, the run configuration, and the fixed
//! image generation parameters.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// One persisted unit of output. Never mutated once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DreamRecord {
    pub timestamp: String, // Format: ISO-8601 UTC, e.g. 2024-05-01T06:00:00.123456Z
    pub prompt: String,
    pub poem: String,
    pub image_url: String,
}

impl DreamRecord {
    pub fn new(timestamp: DateTime<Utc>, prompt: String, poem: &str, image_url: String) -> Self {
        Self {
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            prompt,
            poem: poem.trim().to_string(),
            image_url,
        }
    }
}

/// The on-disk JSON document: `{"dreams": [...]}`.
///
/// Existing entries are kept as raw JSON so a rewrite carries them through
/// exactly as they were read, including keys and shapes this crate does not
/// know about. Keys other than `dreams` are carried through as well.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DreamLog {
    #[serde(default)]
    pub dreams: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DreamLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &DreamRecord) -> crate::Result<()> {
        self.dreams.push(serde_json::to_value(record)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.dreams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dreams.is_empty()
    }

    /// Entries that have the full record shape. Others are skipped.
    pub fn records(&self) -> Vec<DreamRecord> {
        self.dreams
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect()
    }

    pub fn latest(&self) -> Option<DreamRecord> {
        self.dreams
            .last()
            .and_then(|entry| serde_json::from_value(entry.clone()).ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextProvider {
    Gemini,
    OpenAi,
}

impl TextProvider {
    pub fn default_model(self) -> &'static str {
        match self {
            TextProvider::Gemini => "gemini-1.5-flash",
            TextProvider::OpenAi => "gpt-4o-mini",
        }
    }

    fn api_key_var(self) -> &'static str {
        match self {
            TextProvider::Gemini => "GEMINI_API_KEY",
            TextProvider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for TextProvider {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(TextProvider::Gemini),
            "openai" => Ok(TextProvider::OpenAi),
            other => Err(crate::Error::Config(format!(
                "Unknown TEXT_PROVIDER '{}'. Expected 'gemini' or 'openai'",
                other
            ))),
        }
    }
}

/// How seeds are picked when no fixed seed is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedMode {
    /// Random subject, concept and style.
    #[default]
    Composed,
    /// One of the hand-written classic seeds.
    Classic,
}

impl FromStr for SeedMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "composed" => Ok(SeedMode::Composed),
            "classic" => Ok(SeedMode::Classic),
            other => Err(crate::Error::Config(format!(
                "Unknown SEED_MODE '{}'. Expected 'composed' or 'classic'",
                other
            ))),
        }
    }
}

/// Fixed parameters sent with every text-to-image request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageParams {
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg_scale: f32,
    pub samples: u32,
}

impl Default for ImageParams {
    fn default() -> Self {
        Self {
            width: 1344,
            height: 768,
            steps: 50,
            cfg_scale: 8.0,
            samples: 1,
        }
    }
}

pub const DEFAULT_STABILITY_ENGINE: &str = "stable-diffusion-xl-1024-v1-0";

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub text_provider: TextProvider,
    pub text_model: String,
    pub text_api_key: String,
    pub stability_api_key: String,
    pub stability_engine: String,
    pub image_params: ImageParams,
    pub dreams_json: PathBuf,
    pub image_dir: PathBuf,
    pub fixed_seed: Option<String>,
    pub seed_mode: SeedMode,
    pub seed_lists_dir: Option<PathBuf>,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_vars<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| crate::Error::Config(format!("{} not set", key)))
        };

        let text_provider = match get("TEXT_PROVIDER") {
            Some(value) => value.parse()?,
            None => TextProvider::Gemini,
        };

        let seed_mode = match get("SEED_MODE") {
            Some(value) => value.parse()?,
            None => SeedMode::default(),
        };

        let defaults = ImageParams::default();
        let image_params = ImageParams {
            width: parse_var(&get, "IMAGE_WIDTH", defaults.width)?,
            height: parse_var(&get, "IMAGE_HEIGHT", defaults.height)?,
            steps: parse_var(&get, "IMAGE_STEPS", defaults.steps)?,
            cfg_scale: parse_var(&get, "IMAGE_CFG_SCALE", defaults.cfg_scale)?,
            samples: defaults.samples,
        };
        if image_params.width == 0 || image_params.height == 0 || image_params.steps == 0 {
            return Err(crate::Error::Config(
                "IMAGE_WIDTH, IMAGE_HEIGHT and IMAGE_STEPS must be non-zero".to_string(),
            ));
        }

        Ok(Self {
            text_provider,
            text_model: get("TEXT_MODEL")
                .unwrap_or_else(|| text_provider.default_model().to_string()),
            text_api_key: require(text_provider.api_key_var())?,
            stability_api_key: require("STABILITY_API_KEY")?,
            stability_engine: get("STABILITY_ENGINE")
                .unwrap_or_else(|| DEFAULT_STABILITY_ENGINE.to_string()),
            image_params,
            dreams_json: get("DREAMS_JSON")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("dreams.json")),
            image_dir: get("IMAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("generated_images")),
            fixed_seed: get("DREAM_SEED"),
            seed_mode,
            seed_lists_dir: get("SEED_LISTS_DIR").map(PathBuf::from),
            dry_run: get("DRY_RUN").map(|v| is_truthy(&v)).unwrap_or(false),
        })
    }
}

fn parse_var<T, G>(get: &G, key: &str, default: T) -> crate::Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| crate::Error::Config(format!("Invalid value for {}: '{}'", key, raw))),
        None => Ok(default),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config_from(pairs: &[(&str, &str)]) -> crate::Result<Config> {
        let map = vars(pairs);
        Config::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_dream_record_formats_timestamp_and_trims_poem() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
        let record = DreamRecord::new(
            ts,
            "A frozen library in the Arctic".to_string(),
            "\n  Ice keeps the sagas.\n",
            "generated_images/2024-05-01_06-00-00.png".to_string(),
        );

        assert_eq!(record.timestamp, "2024-05-01T06:00:00.000000Z");
        assert_eq!(record.poem, "Ice keeps the sagas.");
    }

    #[test]
    fn test_dream_log_preserves_unknown_keys() {
        let json = r#"{"title":"The Skald","dreams":[]}"#;
        let log: DreamLog = serde_json::from_str(json).unwrap();
        assert!(log.is_empty());

        let out = serde_json::to_string(&log).unwrap();
        assert!(out.contains("\"title\":\"The Skald\""));
        assert!(out.contains("\"dreams\":[]"));
    }

    #[test]
    fn test_dream_log_keeps_entries_it_cannot_type() {
        let json = r#"{"dreams":[{"timestamp":"2023-01-01T00:00:00Z","poem":"no prompt here","image_prompt":"KEEP ME"}]}"#;
        let mut log: DreamLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.len(), 1);
        assert!(log.records().is_empty());

        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
        let record = DreamRecord::new(ts, "seed".to_string(), "poem", "a.png".to_string());
        log.push(&record).unwrap();

        assert_eq!(log.dreams[0]["image_prompt"], "KEEP ME");
        assert!(log.dreams[0].get("prompt").is_none());
        assert_eq!(log.records(), vec![record.clone()]);
        assert_eq!(log.latest(), Some(record));
    }

    #[test]
    fn test_dream_log_missing_dreams_key_defaults_empty() {
        let log: DreamLog = serde_json::from_str("{}").unwrap();
        assert_eq!(log.len(), 0);
        assert!(log.latest().is_none());
    }

    #[test]
    fn test_config_defaults() {
        let config =
            config_from(&[("GEMINI_API_KEY", "g-key"), ("STABILITY_API_KEY", "s-key")]).unwrap();

        assert_eq!(config.text_provider, TextProvider::Gemini);
        assert_eq!(config.text_model, "gemini-1.5-flash");
        assert_eq!(config.text_api_key, "g-key");
        assert_eq!(config.stability_api_key, "s-key");
        assert_eq!(config.stability_engine, DEFAULT_STABILITY_ENGINE);
        assert_eq!(config.image_params, ImageParams::default());
        assert_eq!(config.dreams_json, PathBuf::from("dreams.json"));
        assert_eq!(config.image_dir, PathBuf::from("generated_images"));
        assert!(config.fixed_seed.is_none());
        assert_eq!(config.seed_mode, SeedMode::Composed);
        assert!(!config.dry_run);
    }

    #[test]
    fn test_config_missing_keys_is_configuration_error() {
        let err = config_from(&[("GEMINI_API_KEY", "g-key")]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
        assert!(err.to_string().contains("STABILITY_API_KEY"));

        let err = config_from(&[("GEMINI_API_KEY", "  "), ("STABILITY_API_KEY", "s")]).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_config_openai_provider_requires_openai_key() {
        let err = config_from(&[
            ("TEXT_PROVIDER", "openai"),
            ("GEMINI_API_KEY", "g-key"),
            ("STABILITY_API_KEY", "s-key"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let config = config_from(&[
            ("TEXT_PROVIDER", "OpenAI"),
            ("OPENAI_API_KEY", "o-key"),
            ("STABILITY_API_KEY", "s-key"),
        ])
        .unwrap();
        assert_eq!(config.text_provider, TextProvider::OpenAi);
        assert_eq!(config.text_model, "gpt-4o-mini");
        assert_eq!(config.text_api_key, "o-key");
    }

    #[test]
    fn test_config_overrides() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "g-key"),
            ("STABILITY_API_KEY", "s-key"),
            ("IMAGE_WIDTH", "1024"),
            ("IMAGE_HEIGHT", "1024"),
            ("IMAGE_STEPS", "30"),
            ("IMAGE_CFG_SCALE", "7.5"),
            ("DREAM_SEED", "A saga told by the aurora borealis"),
            ("DRY_RUN", "true"),
        ])
        .unwrap();

        assert_eq!(config.image_params.width, 1024);
        assert_eq!(config.image_params.height, 1024);
        assert_eq!(config.image_params.steps, 30);
        assert_eq!(config.image_params.cfg_scale, 7.5);
        assert_eq!(
            config.fixed_seed.as_deref(),
            Some("A saga told by the aurora borealis")
        );
        assert!(config.dry_run);
    }

    #[test]
    fn test_config_rejects_invalid_numbers() {
        let err = config_from(&[
            ("GEMINI_API_KEY", "g-key"),
            ("STABILITY_API_KEY", "s-key"),
            ("IMAGE_STEPS", "many"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("IMAGE_STEPS"));

        let err = config_from(&[
            ("GEMINI_API_KEY", "g-key"),
            ("STABILITY_API_KEY", "s-key"),
            ("IMAGE_WIDTH", "0"),
        ])
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_config_seed_mode() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "g-key"),
            ("STABILITY_API_KEY", "s-key"),
            ("SEED_MODE", "Classic"),
        ])
        .unwrap();
        assert_eq!(config.seed_mode, SeedMode::Classic);

        let err = config_from(&[
            ("GEMINI_API_KEY", "g-key"),
            ("STABILITY_API_KEY", "s-key"),
            ("SEED_MODE", "runic"),
        ])
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
        assert!(err.to_string().contains("runic"));
    }

    #[test]
    fn test_unknown_text_provider() {
        let err = "claude".parse::<TextProvider>().unwrap_err();
        assert!(err.to_string().contains("claude"));
    }
}
