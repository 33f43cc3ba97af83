use std::io;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to persist config: {0}")]
    Io(#[from] io::Error),
}

/// Key/value persistence behind the editor. The actor owns an
/// `Arc<dyn ConfigStore>`, so hosts can substitute their own backing store
/// and tests run against [`crate::config::MemoryStore`].
///
/// Writes are last-write-wins per key. A failed persist still leaves the
/// in-memory value updated; the editor keeps working and the next
/// successful write carries the full document.
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value) -> Result<(), ConfigError>;
}
