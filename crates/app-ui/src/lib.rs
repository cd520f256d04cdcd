//! User interface state for HustleHub
//!
//! This crate provides the navigation graph that consumes the startup
//! destination and moves the user between splash, onboarding, login and
//! home.
//!
//! # Example
//!
//! ```rust
//! use app_state::Destination;
//! use app_ui::{NavGraph, Route};
//!
//! let mut graph = NavGraph::new();
//! assert_eq!(*graph.current_route(), Route::Splash);
//!
//! graph.on_splash_resolved(Destination::Onboarding);
//! graph.on_onboarding_finished();
//! assert_eq!(*graph.current_route(), Route::Login);
//! assert!(!graph.can_go_back());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod navigation;

pub use navigation::{
    paths, NavGraph, NavigationAnimation, NavigationStack, PendingNavigation, Route, StackEntry,
};
