//! Storage layer for HustleHub
//!
//! This crate provides the key-value preference store, versioned
//! on-disk documents, and the preference contract used at startup.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod persistence;
pub mod preferences;

pub use kv::{KvConfig, KvError, KvStore};
pub use persistence::{PersistedState, PersistenceConfig, PersistenceError};
pub use preferences::{
    FlagBackend, KvPreferenceStore, PreferenceError, PreferenceStore, IS_FIRST_LAUNCH_KEY,
};
