//! User preferences consulted at startup
//!
//! The only preference the startup flow depends on is the first-launch flag.
//! Reads never fail just because the backing store is unreadable: the flag
//! then defaults to `true` so onboarding is shown. Writes are best-effort;
//! failures are logged here and handed back for callers that care.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::kv::{self, KvError, KvStore};

/// Key holding the first-launch flag
pub const IS_FIRST_LAUNCH_KEY: &str = "is_first_launch";

/// Preference store error types
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The backing store failed
    #[error("Preference storage error: {0}")]
    Storage(#[from] KvError),

    /// A stored value exists but is not the expected type
    #[error("Corrupt preference value for {key}: {reason}")]
    Corrupt {
        /// Preference key
        key: String,
        /// Decoder message
        reason: String,
    },

    /// The blocking storage task did not complete
    #[error("Preference task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for preference operations
pub type Result<T> = std::result::Result<T, PreferenceError>;

/// Read/write contract of the preference store used by the startup flow
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Whether onboarding has never been completed.
    ///
    /// Returns `Ok(true)` when the flag is unset or the storage is unreadable.
    async fn read_first_launch(&self) -> Result<bool>;

    /// Persist that onboarding is complete.
    ///
    /// Failures are logged by the store; the returned error may be ignored.
    async fn mark_first_launch_complete(&self) -> Result<()>;
}

/// Synchronous flag storage underneath [`KvPreferenceStore`].
///
/// Calls may block; the preference store runs them on the blocking pool.
pub trait FlagBackend: Clone + Send + Sync + 'static {
    /// Stored flag, `None` when unset
    fn read_flag(&self, key: &str) -> kv::Result<Option<bool>>;

    /// Store the flag and make it durable
    fn write_flag(&self, key: &str, value: bool) -> kv::Result<()>;
}

impl FlagBackend for KvStore {
    fn read_flag(&self, key: &str) -> kv::Result<Option<bool>> {
        self.get(key)
    }

    fn write_flag(&self, key: &str, value: bool) -> kv::Result<()> {
        self.set(key, &value)?;
        self.flush()
    }
}

/// [`PreferenceStore`] backed by the sled [`KvStore`]
#[derive(Clone)]
pub struct KvPreferenceStore<B = KvStore> {
    backend: B,
}

impl<B: FlagBackend> KvPreferenceStore<B> {
    /// Wrap an opened backend
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Shared handle for injection into the startup router and onboarding
    pub fn shared(backend: B) -> Arc<dyn PreferenceStore> {
        Arc::new(Self::new(backend))
    }
}

#[async_trait]
impl<B: FlagBackend> PreferenceStore for KvPreferenceStore<B> {
    async fn read_first_launch(&self) -> Result<bool> {
        let backend = self.backend.clone();
        let read =
            tokio::task::spawn_blocking(move || backend.read_flag(IS_FIRST_LAUNCH_KEY)).await?;

        match read {
            Ok(value) => Ok(value.unwrap_or(true)),
            Err(KvError::Database(e)) => {
                tracing::error!(error = %e, "Error reading preferences, assuming first launch");
                Ok(true)
            }
            Err(KvError::Serialization(e)) => Err(PreferenceError::Corrupt {
                key: IS_FIRST_LAUNCH_KEY.to_string(),
                reason: e.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn mark_first_launch_complete(&self) -> Result<()> {
        let backend = self.backend.clone();
        let write =
            tokio::task::spawn_blocking(move || backend.write_flag(IS_FIRST_LAUNCH_KEY, false))
                .await;

        let result = match write {
            Ok(inner) => inner.map_err(PreferenceError::from),
            Err(e) => Err(PreferenceError::from(e)),
        };

        if let Err(e) = &result {
            tracing::error!(error = %e, "Error writing preferences");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_unset_flag_defaults_to_first_launch() {
        let store = KvPreferenceStore::new(KvStore::in_memory().unwrap());
        assert!(store.read_first_launch().await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_complete_clears_flag() {
        let kv = KvStore::in_memory().unwrap();
        let store = KvPreferenceStore::new(kv.clone());

        store.mark_first_launch_complete().await.unwrap();

        assert!(!store.read_first_launch().await.unwrap());
        assert_eq!(kv.get::<bool>(IS_FIRST_LAUNCH_KEY).unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_mark_complete_is_idempotent() {
        let store = KvPreferenceStore::new(KvStore::in_memory().unwrap());

        store.mark_first_launch_complete().await.unwrap();
        store.mark_first_launch_complete().await.unwrap();

        assert!(!store.read_first_launch().await.unwrap());
    }

    #[tokio::test]
    async fn test_explicit_true_is_respected() {
        let kv = KvStore::in_memory().unwrap();
        kv.set(IS_FIRST_LAUNCH_KEY, &true).unwrap();

        let store = KvPreferenceStore::new(kv);
        assert!(store.read_first_launch().await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_flag_is_corrupt() {
        let kv = KvStore::in_memory().unwrap();
        kv.set(IS_FIRST_LAUNCH_KEY, &"yes").unwrap();

        let store = KvPreferenceStore::new(kv);
        let result = store.read_first_launch().await;

        assert!(matches!(
            result,
            Err(PreferenceError::Corrupt { ref key, .. }) if key == IS_FIRST_LAUNCH_KEY
        ));
    }

    #[tokio::test]
    async fn test_shared_handle() {
        let store = KvPreferenceStore::shared(KvStore::in_memory().unwrap());
        assert!(store.read_first_launch().await.unwrap());
    }

    /// Backend whose disk has gone away
    #[derive(Clone, Default)]
    struct UnavailableBackend {
        write_attempts: Arc<AtomicUsize>,
    }

    fn disk_gone() -> KvError {
        KvError::Database(sled::Error::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk gone",
        )))
    }

    impl FlagBackend for UnavailableBackend {
        fn read_flag(&self, _key: &str) -> kv::Result<Option<bool>> {
            Err(disk_gone())
        }

        fn write_flag(&self, _key: &str, _value: bool) -> kv::Result<()> {
            self.write_attempts.fetch_add(1, Ordering::SeqCst);
            Err(disk_gone())
        }
    }

    #[tokio::test]
    async fn test_unreadable_store_reads_as_first_launch() {
        let store = KvPreferenceStore::new(UnavailableBackend::default());
        assert!(store.read_first_launch().await.unwrap());
    }

    #[tokio::test]
    async fn test_write_failure_is_returned() {
        let backend = UnavailableBackend::default();
        let store = KvPreferenceStore::new(backend.clone());

        let result = store.mark_first_launch_complete().await;

        assert!(matches!(result, Err(PreferenceError::Storage(KvError::Database(_)))));
        assert_eq!(backend.write_attempts.load(Ordering::SeqCst), 1);
    }
}
