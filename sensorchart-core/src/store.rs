use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remembers the last selected sensor between sessions.
pub trait SelectionStore {
    fn load(&self) -> Option<String>;
    fn store(&mut self, sensor_id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemorySelectionStore {
    value: Option<String>,
    writes: usize,
}

impl MemorySelectionStore {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            writes: 0,
        }
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SelectionStore for MemorySelectionStore {
    fn load(&self) -> Option<String> {
        self.value.clone()
    }

    fn store(&mut self, sensor_id: &str) -> Result<(), StoreError> {
        self.value = Some(sensor_id.to_string());
        self.writes += 1;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSelection {
    selected_sensor: String,
}

/// JSON file holding `{"selected_sensor": "<id>"}`.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SelectionStore for FileSelectionStore {
    /// Missing or unreadable files read as "nothing stored".
    fn load(&self) -> Option<String> {
        let data = std::fs::read(&self.path).ok()?;
        match serde_json::from_slice::<StoredSelection>(&data) {
            Ok(stored) if !stored.selected_sensor.trim().is_empty() => Some(stored.selected_sensor),
            Ok(_) => None,
            Err(err) => {
                log::warn!(
                    "ignoring selection file '{}': {err}",
                    self.path.display()
                );
                None
            }
        }
    }

    fn store(&mut self, sensor_id: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec_pretty(&StoredSelection {
            selected_sensor: sensor_id.to_string(),
        })?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}
