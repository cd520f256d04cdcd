//! Application state for HustleHub
//!
//! This crate holds the state behind the launch experience: the auth
//! session, the splash-screen startup router, and the onboarding flow.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod onboarding;
pub mod session;
pub mod startup;

pub use onboarding::{default_slides, OnboardingFlow, OnboardingSlide, PagerStep};
pub use session::{provide_auth, AuthConfig, AuthProvider, Session, SessionStateError, SessionStore};
pub use startup::{
    Destination, LaunchState, RouterOutcome, SideEffect, SplashHandle, StartupConfig,
    StartupError, StartupRouter, MIN_SPLASH_DURATION,
};
