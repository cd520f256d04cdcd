//! Versioned on-disk documents
//!
//! A [`PersistedState`] holds one JSON document in memory and mirrors every
//! change to disk. The file wraps the data in an envelope carrying a schema
//! version and an md5 checksum, so a hand-edited or truncated file is
//! rejected when loading.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Errors loading or saving a [`PersistedState`]
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File could not be read or written
    #[error("Document I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// File contents are not an envelope of the expected type
    #[error("Document is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored checksum does not match the stored data
    #[error("Document checksum mismatch (stored {stored}, computed {computed})")]
    Corruption {
        /// Checksum recorded in the file
        stored: String,
        /// Checksum of the data as read
        computed: String,
    },

    /// Document was written by a different schema version
    #[error("Document schema is v{found}, expected v{expected}")]
    VersionMismatch {
        /// Version this build reads
        expected: u32,
        /// Version found on disk
        found: u32,
    },
}

/// Result type for document operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    checksum: String,
    data: T,
}

fn checksum_of<T: Serialize>(data: &T) -> Result<String> {
    let bytes = serde_json::to_vec(data)?;
    Ok(format!("{:x}", md5::compute(bytes)))
}

/// Location and schema version of a document
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Document file
    pub path: PathBuf,
    /// Schema version written and accepted
    pub version: u32,
}

impl PersistenceConfig {
    /// Version 1 document at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), version: 1 }
    }

    /// Set schema version
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

/// In-memory document mirrored to a file
pub struct PersistedState<T> {
    config: PersistenceConfig,
    state: RwLock<T>,
}

impl<T> PersistedState<T>
where
    T: Serialize + DeserializeOwned + Clone + Default,
{
    /// Load the document; a missing file yields `T::default()` and is only
    /// created on the first write.
    pub async fn load(config: PersistenceConfig) -> Result<Self> {
        let data = match fs::read(&config.path).await {
            Ok(bytes) => Self::decode(&config, &bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => T::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { config, state: RwLock::new(data) })
    }

    /// Snapshot of the current document
    pub async fn get(&self) -> T {
        self.state.read().await.clone()
    }

    /// Apply `f` and persist. Memory is only updated once the write succeeds.
    pub async fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        f(&mut next);

        self.write(&next).await?;
        *state = next;
        Ok(())
    }

    /// Reset to the default document and delete the file
    pub async fn clear(&self) -> Result<()> {
        let mut state = self.state.write().await;

        match fs::remove_file(&self.config.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        *state = T::default();
        Ok(())
    }

    fn decode(config: &PersistenceConfig, bytes: &[u8]) -> Result<T> {
        let envelope: Envelope<T> = serde_json::from_slice(bytes)?;

        let computed = checksum_of(&envelope.data)?;
        if computed != envelope.checksum {
            return Err(PersistenceError::Corruption { stored: envelope.checksum, computed });
        }

        if envelope.version != config.version {
            return Err(PersistenceError::VersionMismatch {
                expected: config.version,
                found: envelope.version,
            });
        }

        Ok(envelope.data)
    }

    // Temp file + rename so readers never see a half-written document
    async fn write(&self, data: &T) -> Result<()> {
        let checksum = checksum_of(data)?;
        let envelope = Envelope { version: self.config.version, checksum, data };
        let json = serde_json::to_vec_pretty(&envelope)?;

        if let Some(parent) = self.config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.config.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.config.path).await?;
        Ok(())
    }
}
