//! Authentication session state
//!
//! The startup router only needs to know whether a user is signed in, so
//! auth is exposed through the narrow [`AuthProvider`] trait. [`SessionStore`]
//! is the persisted implementation; when it cannot be brought up the app
//! runs without auth and every launch sees "no session".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use storage::persistence::{PersistedState, PersistenceConfig, PersistenceError};

/// Session-related errors
#[derive(Debug, thiserror::Error)]
pub enum SessionStateError {
    /// Session file could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// No session path configured
    #[error("Auth is not configured")]
    NotConfigured,

    /// Session rejected before storing
    #[error("Invalid session: {0}")]
    InvalidSession(String),
}

/// Result type for session state operations
pub type Result<T> = std::result::Result<T, SessionStateError>;

/// Evidence that a user is signed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl Session {
    /// Create a session for a user id
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into(), email: None }
    }

    /// Attach the account email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// User id
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Account email, if known
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// On-disk session document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStorage {
    /// Signed-in session, if any
    #[serde(default)]
    pub session: Option<Session>,
}

/// Source of the current authentication session
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in session, or `None` when nobody is signed in
    async fn current_session(&self) -> Option<Session>;
}

/// Auth configuration
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Where the session document lives; `None` disables auth
    pub session_path: Option<PathBuf>,
}

impl AuthConfig {
    /// Auth backed by a session file
    pub fn new(session_path: impl Into<PathBuf>) -> Self {
        Self { session_path: Some(session_path.into()) }
    }

    /// Auth disabled
    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Persisted single-account session store
pub struct SessionStore {
    storage: PersistedState<SessionStorage>,
}

impl SessionStore {
    /// Open the session document at `path`, creating it lazily on first write
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let storage = PersistedState::load(PersistenceConfig::new(path)).await?;
        Ok(Self { storage })
    }

    /// Open the store described by `config`
    pub async fn from_config(config: &AuthConfig) -> Result<Self> {
        match &config.session_path {
            Some(path) => Self::open(path.clone()).await,
            None => Err(SessionStateError::NotConfigured),
        }
    }

    /// Record a signed-in session, replacing any previous one
    pub async fn sign_in(&self, session: Session) -> Result<()> {
        if session.uid.trim().is_empty() {
            return Err(SessionStateError::InvalidSession("empty uid".to_string()));
        }

        tracing::info!(uid = %session.uid, "signed in");
        self.storage.update(|s| s.session = Some(session)).await?;
        Ok(())
    }

    /// Forget the signed-in session
    pub async fn sign_out(&self) -> Result<()> {
        self.storage.update(|s| s.session = None).await?;
        tracing::info!("signed out");
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for SessionStore {
    async fn current_session(&self) -> Option<Session> {
        self.storage.get().await.session
    }
}

/// Bring up auth, or `None` if it cannot be initialized.
///
/// The app keeps running without auth in that case.
pub async fn provide_auth(config: &AuthConfig) -> Option<Arc<SessionStore>> {
    match SessionStore::from_config(config).await {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            tracing::warn!(error = %e, "Auth not initialized, running without auth");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_new_store_has_no_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::open(temp_dir.path().join("session.json")).await.unwrap();

        assert_eq!(store.current_session().await, None);
    }

    #[tokio::test]
    async fn test_sign_in_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");

        {
            let store = SessionStore::open(&path).await.unwrap();
            store
                .sign_in(Session::new("uid-1").with_email("wanjiru@students.must.ac.ke"))
                .await
                .unwrap();
        }

        let store = SessionStore::open(&path).await.unwrap();
        let session = store.current_session().await.unwrap();
        assert_eq!(session.uid(), "uid-1");
        assert_eq!(session.email(), Some("wanjiru@students.must.ac.ke"));
    }

    #[tokio::test]
    async fn test_sign_out() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::open(temp_dir.path().join("session.json")).await.unwrap();

        store.sign_in(Session::new("uid-1")).await.unwrap();
        store.sign_out().await.unwrap();

        assert_eq!(store.current_session().await, None);
    }

    #[tokio::test]
    async fn test_empty_uid_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::open(temp_dir.path().join("session.json")).await.unwrap();

        let result = store.sign_in(Session::new("  ")).await;
        assert!(matches!(result, Err(SessionStateError::InvalidSession(_))));
        assert_eq!(store.current_session().await, None);
    }

    #[tokio::test]
    async fn test_provide_auth_disabled() {
        assert!(provide_auth(&AuthConfig::disabled()).await.is_none());
    }

    #[tokio::test]
    async fn test_provide_auth_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        assert!(provide_auth(&AuthConfig::new(&path)).await.is_none());
    }

    #[tokio::test]
    async fn test_provide_auth_ready() {
        let temp_dir = TempDir::new().unwrap();
        let auth = provide_auth(&AuthConfig::new(temp_dir.path().join("session.json"))).await;

        assert!(auth.is_some());
    }

    #[test]
    fn test_session_serialization_shape() {
        let json = serde_json::to_value(Session::new("abc")).unwrap();
        assert_eq!(json, serde_json::json!({ "uid": "abc" }));
    }
}
