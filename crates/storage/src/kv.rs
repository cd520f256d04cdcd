//! Key-value store backing the app's preference data store
//!
//! Values are stored as JSON under plain string keys in a sled database,
//! so a preference written as `false` reads back as `false` and anything
//! else under the same key is reported as a serialization error.

use serde::{de::DeserializeOwned, Serialize};
use sled::Db;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by [`KvStore`]
#[derive(Debug, Error)]
pub enum KvError {
    /// Backing storage could not be read or written
    #[error("Preference database unavailable: {0}")]
    Database(#[from] sled::Error),

    /// Stored bytes did not decode to the requested type
    #[error("Malformed preference value: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Empty keys are never valid
    #[error("Invalid preference key: {0:?}")]
    InvalidKey(String),
}

/// Result type for key-value operations
pub type Result<T> = std::result::Result<T, KvError>;

/// Where and how the preference database is opened
#[derive(Debug, Clone)]
pub struct KvConfig {
    /// Database directory
    pub path: PathBuf,
    /// Background flush period; `None` persists only on [`KvStore::flush`]
    pub flush_every_ms: Option<u64>,
    /// Discard the database when the last handle is dropped
    pub temporary: bool,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hustlehub_preferences"),
            flush_every_ms: Some(500),
            temporary: false,
        }
    }
}

impl KvConfig {
    /// Persistent database at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    /// Set the background flush period
    pub fn flush_every_ms(mut self, ms: Option<u64>) -> Self {
        self.flush_every_ms = ms;
        self
    }

    /// Use a throwaway database
    pub fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }
}

/// Cloneable handle to the preference database
#[derive(Clone)]
pub struct KvStore {
    db: Arc<Db>,
}

impl KvStore {
    /// Open the database described by `config`
    pub fn new(config: KvConfig) -> Result<Self> {
        let db = if config.temporary {
            sled::Config::new().temporary(true).open()?
        } else {
            sled::Config::new()
                .path(&config.path)
                .flush_every_ms(config.flush_every_ms)
                .open()?
        };
        tracing::debug!(
            path = %config.path.display(),
            temporary = config.temporary,
            "opened preference store"
        );

        Ok(Self { db: Arc::new(db) })
    }

    /// Throwaway store for tests and previews
    pub fn in_memory() -> Result<Self> {
        Self::new(KvConfig::default().temporary(true))
    }

    /// Decode the value under `key`, `None` when unset
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.db.get(checked(key)?)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Encode and store `value` under `key`
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.db.insert(checked(key)?, bytes)?;
        Ok(())
    }

    /// Returns whether a value was present
    pub fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.db.remove(checked(key)?)?.is_some())
    }

    /// Whether any value is stored under `key`
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.db.contains_key(checked(key)?)?)
    }

    /// Drop every stored preference
    pub fn clear(&self) -> Result<()> {
        self.db.clear()?;
        Ok(())
    }

    /// Block until pending writes are durable
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

fn checked(key: &str) -> Result<&[u8]> {
    if key.is_empty() {
        return Err(KvError::InvalidKey(key.to_string()));
    }
    Ok(key.as_bytes())
}
