//! Persistence for generated dreams
//!
//! Images are written to a directory of timestamp-named PNG files and each
//! run appends one record to the `{"dreams": [...]}` JSON log. Writes are
//! in place with no locking: one run at a time is assumed.

pub mod local;
pub mod memory;

pub use local::LocalDreamStore;
pub use memory::MemoryDreamStore;

use crate::models::{DreamLog, DreamRecord};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub trait DreamStore: Send + Sync {
    /// Persist image bytes under `file_name`, returning the reference stored in the record.
    fn save_image(&self, file_name: &str, data: &[u8]) -> Result<String>;

    fn load_log(&self) -> Result<DreamLog>;

    /// Append one record after all existing ones. Returns the new record count.
    fn append_record(&self, record: DreamRecord) -> Result<usize>;
}

/// `2024-05-01_06-00-00.png` style file name for a run started at `timestamp`.
pub fn image_file_name(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d_%H-%M-%S.png").to_string()
}

/// Pretty JSON with 4-space indentation, matching the log's established layout.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_image_file_name_uses_utc_timestamp() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 7).unwrap();
        assert_eq!(image_file_name(ts), "2024-12-31_23-59-07.png");
    }

    #[test]
    fn test_pretty_json_uses_four_space_indent() {
        let json = to_pretty_json(&DreamLog::new()).unwrap();
        assert_eq!(String::from_utf8(json).unwrap(), "{\n    \"dreams\": []\n}");
    }
}
