use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::config::store::{ConfigError, ConfigStore};

/// In-memory [`ConfigStore`] for tests and ephemeral hosts. Counts writes
/// per key so tests can assert that mutations actually hit persistence.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Value>>,
    writes: Mutex<HashMap<String, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self, key: &str) -> usize {
        self.writes.lock().unwrap().get(key).copied().unwrap_or(0)
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Result<(), ConfigError> {
        *self
            .writes
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_insert(0) += 1;
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}
