use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::config::store::{ConfigError, ConfigStore};

/// Key names live here and nowhere else, so the generic get/set surface and
/// the typed accessors below can never drift apart.
pub const ROOT_DIRECTORY: &str = "rootDirectory";
pub const EXPANDED_FOLDERS: &str = "expandedFolders";
pub const OPEN_FILES: &str = "openFiles";
pub const ACTIVE_FILE: &str = "activeFile";

/// Typed view over the persisted session keys. Malformed values read back
/// as absent rather than failing, since the store is shared with hosts that
/// may write whatever they like under other keys.
#[derive(Clone)]
pub struct SessionConfig {
    store: Arc<dyn ConfigStore>,
}

impl SessionConfig {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    pub fn root_directory(&self) -> Option<PathBuf> {
        match self.store.get(ROOT_DIRECTORY)? {
            Value::String(path) => Some(PathBuf::from(path)),
            _ => None,
        }
    }

    pub fn set_root_directory(&self, root: &Path) -> Result<(), ConfigError> {
        self.store.set(ROOT_DIRECTORY, path_value(root))
    }

    pub fn expanded_folders(&self) -> Vec<PathBuf> {
        path_list(self.store.get(EXPANDED_FOLDERS))
    }

    pub fn set_expanded_folders(&self, folders: &[PathBuf]) -> Result<(), ConfigError> {
        self.store.set(EXPANDED_FOLDERS, path_list_value(folders))
    }

    pub fn open_files(&self) -> Vec<PathBuf> {
        path_list(self.store.get(OPEN_FILES))
    }

    pub fn set_open_files(&self, files: &[PathBuf]) -> Result<(), ConfigError> {
        self.store.set(OPEN_FILES, path_list_value(files))
    }

    pub fn active_file(&self) -> Option<PathBuf> {
        match self.store.get(ACTIVE_FILE)? {
            Value::String(path) => Some(PathBuf::from(path)),
            _ => None,
        }
    }

    pub fn set_active_file(&self, file: Option<&Path>) -> Result<(), ConfigError> {
        let value = match file {
            Some(path) => path_value(path),
            None => Value::Null,
        };
        self.store.set(ACTIVE_FILE, value)
    }
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

fn path_list_value(paths: &[PathBuf]) -> Value {
    Value::Array(paths.iter().map(|path| path_value(path)).collect())
}

fn path_list(value: Option<Value>) -> Vec<PathBuf> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(path) => Some(PathBuf::from(path)),
            _ => None,
        })
        .collect()
}
