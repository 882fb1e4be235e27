use super::{to_pretty_json, DreamStore};
use crate::models::{DreamLog, DreamRecord};
use crate::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Filesystem-backed store: a JSON log file plus an image directory.
pub struct LocalDreamStore {
    json_path: PathBuf,
    image_dir: PathBuf,
}

impl LocalDreamStore {
    pub fn new(json_path: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            json_path: json_path.into(),
            image_dir: image_dir.into(),
        }
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }
}

impl DreamStore for LocalDreamStore {
    fn save_image(&self, file_name: &str, data: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.image_dir)?;
        let image_path = self.image_dir.join(file_name);

        // Never clobber an image an earlier record points at.
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&image_path)?;
        file.write_all(data)?;
        file.sync_all()?;

        info!("Image saved to: {}", image_path.display());
        Ok(image_path.to_string_lossy().into_owned())
    }

    fn load_log(&self) -> Result<DreamLog> {
        let raw = match fs::read_to_string(&self.json_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No dream log at {}, starting a new one",
                    self.json_path.display()
                );
                return Ok(DreamLog::new());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw).map_err(|e| {
            Error::DreamLog(format!(
                "{} is not a valid dream log: {}",
                self.json_path.display(),
                e
            ))
        })
    }

    fn append_record(&self, record: DreamRecord) -> Result<usize> {
        let mut log = self.load_log()?;
        log.push(&record)?;

        if let Some(parent) = self.json_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.json_path, to_pretty_json(&log)?)?;

        info!(
            "Appended dream #{} to {}",
            log.len(),
            self.json_path.display()
        );
        Ok(log.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    fn setup_store() -> (TempDir, LocalDreamStore) {
        let dir = tempdir().unwrap();
        let store = LocalDreamStore::new(
            dir.path().join("dreams.json"),
            dir.path().join("generated_images"),
        );
        (dir, store)
    }

    fn record(n: u32) -> DreamRecord {
        DreamRecord::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, n).unwrap(),
            format!("seed {}", n),
            &format!("poem {}", n),
            format!("generated_images/{}.png", n),
        )
    }

    #[test]
    fn test_missing_log_loads_empty() {
        let (_dir, store) = setup_store();
        assert!(store.load_log().unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_order_of_existing_records() {
        let (_dir, store) = setup_store();

        for n in 0..5 {
            assert_eq!(store.append_record(record(n)).unwrap(), n as usize + 1);
        }

        let log = store.load_log().unwrap();
        let expected: Vec<DreamRecord> = (0..5).map(record).collect();
        assert_eq!(log.records(), expected);
    }

    #[test]
    fn test_append_keeps_other_top_level_keys() {
        let (_dir, store) = setup_store();
        fs::write(
            store.json_path(),
            r#"{"skald": "asleep", "dreams": [{"timestamp": "2023-01-01T00:00:00Z", "prompt": "p", "poem": "old", "image_url": "a.png"}]}"#,
        )
        .unwrap();

        store.append_record(record(1)).unwrap();

        let raw = fs::read_to_string(store.json_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["skald"], "asleep");
        assert_eq!(value["dreams"][0]["poem"], "old");
        assert_eq!(value["dreams"][1]["poem"], "poem 1");
        assert!(raw.contains("\n    \"dreams\": ["));
    }

    #[test]
    fn test_append_keeps_legacy_entries_as_written() {
        let (_dir, store) = setup_store();
        fs::write(
            store.json_path(),
            r#"{"dreams": [
                {"timestamp": "2023-01-01T00:00:00Z", "prompt": "p", "poem": "old", "image_url": "a.png", "image_prompt": "KEEP ME"},
                {"timestamp": "2023-01-02T00:00:00Z", "poem": "no prompt recorded", "image_url": "b.png"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(store.load_log().unwrap().len(), 2);
        assert_eq!(store.append_record(record(1)).unwrap(), 3);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.json_path()).unwrap()).unwrap();
        assert_eq!(value["dreams"][0]["image_prompt"], "KEEP ME");
        assert_eq!(
            value["dreams"][1],
            serde_json::json!({
                "timestamp": "2023-01-02T00:00:00Z",
                "poem": "no prompt recorded",
                "image_url": "b.png"
            })
        );
        assert_eq!(value["dreams"][2]["prompt"], "seed 1");
        assert_eq!(store.load_log().unwrap().latest(), Some(record(1)));
    }

    #[test]
    fn test_malformed_log_is_not_overwritten() {
        let (_dir, store) = setup_store();
        fs::write(store.json_path(), "{ not json").unwrap();

        let err = store.append_record(record(1)).unwrap_err();
        assert!(matches!(err, Error::DreamLog(_)));
        assert_eq!(
            fs::read_to_string(store.json_path()).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn test_save_image_creates_directory_and_file() {
        let (_dir, store) = setup_store();

        let reference = store
            .save_image("2024-01-01_00-00-00.png", &[1, 2, 3])
            .unwrap();

        let path = store.image_dir().join("2024-01-01_00-00-00.png");
        assert_eq!(reference, path.to_string_lossy());
        assert_eq!(fs::read(path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_save_image_refuses_to_overwrite() {
        let (_dir, store) = setup_store();
        store.save_image("same.png", &[1]).unwrap();

        let err = store.save_image("same.png", &[2]).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(fs::read(store.image_dir().join("same.png")).unwrap(), vec![1]);
    }
}
