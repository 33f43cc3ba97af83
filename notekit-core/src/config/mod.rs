//! Persisted configuration.
//!
//! The editor stores everything it remembers between launches in one flat
//! key/value document behind the [`ConfigStore`] trait: the JSON file store
//! for production, an in-memory store for tests. [`SessionConfig`] is the
//! typed view over the session keys the actor itself maintains.

pub mod json;
pub mod memory;
pub mod session;
pub mod store;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use session::SessionConfig;
pub use store::{ConfigError, ConfigStore};
