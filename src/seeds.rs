//! Seed selection
//!
//! Picks the short idea handed to the Skald. A seed is either composed from a
//! random subject, concept and style, drawn from the classic hand-written
//! seeds, or passed through as a fixed phrase.

use crate::{Error, Result};
use rand::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Hand-written seeds from the first generation of the job.
pub const CLASSIC_SEEDS: &[&str] = &[
    "A frozen library in the Arctic",
    "The last geothermal vent on a dying world",
    "A saga told by the aurora borealis",
    "A Viking longship sailing on a sea of clouds",
];

// Bundled lists, also readable from disk via SEED_LISTS_DIR.
const SUBJECTS_JSON: &str = include_str!("../data/seeds/subjects.json");
const CONCEPTS_JSON: &str = include_str!("../data/seeds/concepts.json");
const STYLES_JSON: &str = include_str!("../data/seeds/styles.json");

#[derive(Debug, Deserialize)]
struct SeedList(Vec<String>);

/// Read a single JSON seed-list file into `Vec<String>`.
pub fn load_seed_list(path: &Path) -> Result<Vec<String>> {
    parse_seed_list(&fs::read_to_string(path)?, &path.display().to_string())
}

fn parse_seed_list(raw: &str, source: &str) -> Result<Vec<String>> {
    let list: SeedList = serde_json::from_str(raw)?;
    let entries: Vec<String> = list
        .0
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect();

    if entries.is_empty() {
        return Err(Error::Config(format!("Seed list {} has no entries", source)));
    }
    Ok(entries)
}

/// Random subject/concept/style combiner.
#[derive(Debug, Clone)]
pub struct SeedSelector {
    subjects: Vec<String>,
    concepts: Vec<String>,
    styles: Vec<String>,
}

impl SeedSelector {
    /// Selector over the lists bundled into the binary.
    pub fn builtin() -> Result<Self> {
        let parse = |raw: &str, name: &str| {
            parse_seed_list(raw, name).map_err(|e| {
                Error::Config(format!("Invalid bundled seed list {}: {}", name, e))
            })
        };

        Ok(Self {
            subjects: parse(SUBJECTS_JSON, "subjects.json")?,
            concepts: parse(CONCEPTS_JSON, "concepts.json")?,
            styles: parse(STYLES_JSON, "styles.json")?,
        })
    }

    /// Load subject/concept/style lists from `data_dir`.
    pub fn from_files(data_dir: &Path) -> Result<Self> {
        let load = |name: &str| {
            load_seed_list(&data_dir.join(name)).map_err(|e| match e {
                Error::Io(io) => Error::Config(format!(
                    "Failed to read seed list {}: {}",
                    data_dir.join(name).display(),
                    io
                )),
                Error::Serialization(json) => Error::Config(format!(
                    "Invalid seed list {}: {}",
                    data_dir.join(name).display(),
                    json
                )),
                other => other,
            })
        };

        Ok(Self {
            subjects: load("subjects.json")?,
            concepts: load("concepts.json")?,
            styles: load("styles.json")?,
        })
    }

    pub fn new(subjects: Vec<String>, concepts: Vec<String>, styles: Vec<String>) -> Result<Self> {
        if subjects.is_empty() || concepts.is_empty() || styles.is_empty() {
            return Err(Error::Config(
                "Seed lists must each contain at least one entry".to_string(),
            ));
        }
        Ok(Self {
            subjects,
            concepts,
            styles,
        })
    }

    pub fn compose(&self) -> String {
        self.compose_with_rng(&mut thread_rng())
    }

    pub fn compose_with_rng(&self, rng: &mut impl Rng) -> String {
        let subject = pick(&self.subjects, rng);
        let concept = pick(&self.concepts, rng);
        let style = pick(&self.styles, rng);

        format!("{} {}, {}", subject, concept, style)
    }
}

// Lists are never empty once a selector is constructed.
fn pick(list: &[String], rng: &mut impl Rng) -> String {
    list.choose(rng).cloned().unwrap_or_default()
}

/// Where the run's seed comes from.
#[derive(Debug, Clone)]
pub enum SeedSource {
    Composed(SeedSelector),
    Classic,
    Fixed(String),
}

impl SeedSource {
    pub fn next_seed(&self) -> String {
        self.next_seed_with_rng(&mut thread_rng())
    }

    pub fn next_seed_with_rng(&self, rng: &mut impl Rng) -> String {
        match self {
            SeedSource::Composed(selector) => selector.compose_with_rng(rng),
            SeedSource::Classic => CLASSIC_SEEDS
                .choose(rng)
                .map(|seed| seed.to_string())
                .unwrap_or_default(),
            SeedSource::Fixed(seed) => seed.clone(),
        }
    }
}
