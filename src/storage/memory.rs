use super::DreamStore;
use crate::models::{DreamLog, DreamRecord};
use crate::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory store used for dry runs and tests. Nothing touches disk.
#[derive(Clone)]
pub struct MemoryDreamStore {
    images: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    log: Arc<Mutex<DreamLog>>,
    image_dir: String,
}

impl MemoryDreamStore {
    pub fn new() -> Self {
        Self {
            images: Arc::new(Mutex::new(HashMap::new())),
            log: Arc::new(Mutex::new(DreamLog::new())),
            image_dir: "generated_images".to_string(),
        }
    }

    pub fn with_image_dir(mut self, image_dir: String) -> Self {
        self.image_dir = image_dir;
        self
    }

    pub fn with_log(self, log: DreamLog) -> Self {
        *self.log.lock().unwrap() = log;
        self
    }

    pub fn get_images(&self) -> HashMap<String, Vec<u8>> {
        self.images.lock().unwrap().clone()
    }

    pub fn get_log(&self) -> DreamLog {
        self.log.lock().unwrap().clone()
    }
}

impl Default for MemoryDreamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DreamStore for MemoryDreamStore {
    fn save_image(&self, file_name: &str, data: &[u8]) -> Result<String> {
        let reference = format!("{}/{}", self.image_dir, file_name);
        self.images
            .lock()
            .unwrap()
            .insert(reference.clone(), data.to_vec());
        Ok(reference)
    }

    fn load_log(&self) -> Result<DreamLog> {
        Ok(self.get_log())
    }

    fn append_record(&self, record: DreamRecord) -> Result<usize> {
        let mut log = self.log.lock().unwrap();
        log.push(&record)?;
        Ok(log.len())
    }
}
