use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::config::store::{ConfigError, ConfigStore};

/// [`ConfigStore`] backed by a single JSON object on disk, by default
/// `~/.notekit/config.json`. The full document is rewritten on every set via
/// a temp-file-then-rename, so the file on disk is always one complete
/// version or another, never a partial write.
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonFileStore {
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().context("failed to get home directory")?;
        Self::from_path(home.join(".notekit").join("config.json"))
    }

    pub fn from_path(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory: {parent:?}"))?;
        }
        let values = Self::load_or_recover(&path)?;
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A file that no longer parses as a JSON object is moved aside to
    /// `config.json.backup` and startup continues with an empty document,
    /// so one bad write never bricks the editor.
    fn load_or_recover(path: &Path) -> Result<Map<String, Value>> {
        if !path.exists() {
            return Ok(Map::new());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {path:?}"))?;
        match serde_json::from_str(&contents) {
            Ok(Value::Object(values)) => Ok(values),
            Ok(_) | Err(_) => {
                let backup = path.with_extension("json.backup");
                warn!(?path, ?backup, "config file is corrupted, moving it aside");
                fs::rename(path, &backup).with_context(|| {
                    format!("failed to move corrupted config to {backup:?}")
                })?;
                Ok(Map::new())
            }
        }
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(&Value::Object(values.clone()))?;
        let temp = self.path.with_extension(format!("json.{}.tmp", Uuid::new_v4()));
        fs::write(&temp, contents)?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl ConfigStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), ConfigError> {
        let mut values = self.values.lock().unwrap();
        values.insert(key.to_string(), value);
        self.persist(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn starts_empty_without_a_file() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::from_path(dir.path().join("config.json")).unwrap();
        assert_eq!(store.get("rootDirectory"), None);
    }

    #[test]
    fn set_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = JsonFileStore::from_path(path.clone()).unwrap();
        store.set("rootDirectory", json!("/data/notes")).unwrap();

        let reloaded = JsonFileStore::from_path(path).unwrap();
        assert_eq!(reloaded.get("rootDirectory"), Some(json!("/data/notes")));
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/config.json");
        let store = JsonFileStore::from_path(path).unwrap();
        store.set("k", json!(1)).unwrap();
        assert!(dir.path().join("nested/deeper/config.json").exists());
    }

    #[test]
    fn corrupted_file_is_backed_up_and_reset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::from_path(path.clone()).unwrap();
        assert_eq!(store.get("anything"), None);

        let backup = dir.path().join("config.json.backup");
        assert_eq!(fs::read_to_string(backup).unwrap(), "{not json");

        // The store is usable immediately after recovery.
        store.set("k", json!("v")).unwrap();
        assert_eq!(store.get("k"), Some(json!("v")));
    }

    #[test]
    fn non_object_document_counts_as_corrupted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let store = JsonFileStore::from_path(path).unwrap();
        assert_eq!(store.get("k"), None);
        assert!(dir.path().join("config.json.backup").exists());
    }

    #[test]
    fn writes_leave_no_temp_files() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::from_path(dir.path().join("config.json")).unwrap();
        store.set("a", json!(1)).unwrap();
        store.set("b", json!(2)).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["config.json"]);
    }

    #[test]
    fn last_write_wins_per_key() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::from_path(dir.path().join("config.json")).unwrap();
        store.set("k", json!("first")).unwrap();
        store.set("k", json!("second")).unwrap();
        assert_eq!(store.get("k"), Some(json!("second")));
    }
}
