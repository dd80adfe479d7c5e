use nh_core::{Error, Result};
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

pub mod backends;
pub mod preferences;

pub use backends::*;
pub use preferences::PersistentPreferences;

/// Durable string-to-string map. Reads and writes are synchronous and never expire.
pub trait KeyValueStore: Debug + Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub fn create_store(kind: &str, path: Option<&Path>) -> Result<Arc<dyn KeyValueStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "file" => {
            let path = path
                .ok_or_else(|| Error::Config("file storage requires a path".to_string()))?;
            Ok(Arc::new(FileStore::open(path)?))
        }
        other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{KeyValueStore, PersistentPreferences};
}
