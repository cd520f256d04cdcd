//! Splash-screen destination resolution
//!
//! At launch the splash screen asks [`StartupRouter`] where to go. The router
//! reads the first-launch preference and the current auth session while a
//! minimum splash timer runs alongside, then yields exactly one
//! [`Destination`]:
//!
//! | first launch | session | destination  |
//! |--------------|---------|--------------|
//! | yes          | any     | `Onboarding` |
//! | no           | present | `Home`       |
//! | no           | absent  | `Login`      |
//!
//! Failures while checking never reach the caller; they are logged and the
//! destination degrades to `Login`. Dropping the resolve future (or the
//! [`SplashHandle`]) cancels both the timer and the check.
//!
//! # Onboarding completion
//!
//! The router never writes the first-launch flag. It is cleared by the
//! onboarding flow once the user finishes or skips it (see
//! [`crate::onboarding::OnboardingFlow::complete`]). If the app is killed
//! mid-onboarding, onboarding is shown again on the next launch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use storage::preferences::PreferenceStore;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use crate::session::AuthProvider;

/// Minimum time the splash screen stays visible
pub const MIN_SPLASH_DURATION: Duration = Duration::from_millis(2000);

/// Startup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartupError {
    /// The check was cancelled from outside before it produced a result
    #[error("Startup resolution cancelled")]
    Cancelled,
}

/// Result type for startup operations
pub type Result<T> = std::result::Result<T, StartupError>;

/// Whether the user has ever completed onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    /// Onboarding has never been completed
    FirstLaunch,
    /// Onboarding was completed on an earlier launch
    ReturningUser,
}

impl LaunchState {
    /// Derive the launch state from the persisted first-launch flag
    pub fn from_first_launch(first_launch: bool) -> Self {
        if first_launch {
            LaunchState::FirstLaunch
        } else {
            LaunchState::ReturningUser
        }
    }
}

/// Screen the splash screen hands over to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Onboarding carousel
    Onboarding,
    /// Sign-in screen
    Login,
    /// Home feed
    Home,
}

impl Destination {
    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Onboarding => "onboarding",
            Destination::Login => "login",
            Destination::Home => "home",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write that still has to happen after routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Nothing left to do
    None,
    /// Clear the first-launch flag when the onboarding flow finishes
    MarkFirstLaunchCompleteOnFinish,
}

/// A resolved destination and the side effect that goes with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOutcome {
    /// Where to navigate
    pub destination: Destination,
    /// Deferred side effect
    pub side_effect: SideEffect,
}

impl RouterOutcome {
    fn for_destination(destination: Destination) -> Self {
        let side_effect = match destination {
            Destination::Onboarding => SideEffect::MarkFirstLaunchCompleteOnFinish,
            Destination::Login | Destination::Home => SideEffect::None,
        };
        Self { destination, side_effect }
    }
}

/// Startup router configuration
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Floor on how long resolution takes
    pub min_splash_duration: Duration,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self { min_splash_duration: MIN_SPLASH_DURATION }
    }
}

impl StartupConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum splash duration
    pub fn min_splash_duration(mut self, duration: Duration) -> Self {
        self.min_splash_duration = duration;
        self
    }
}

/// Resolves the post-splash destination once per launch
pub struct StartupRouter {
    preferences: Arc<dyn PreferenceStore>,
    auth: Option<Arc<dyn AuthProvider>>,
    config: StartupConfig,
}

impl StartupRouter {
    /// Create a router; `auth` is `None` when auth failed to initialize
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        auth: Option<Arc<dyn AuthProvider>>,
    ) -> Self {
        Self { preferences, auth, config: StartupConfig::default() }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: StartupConfig) -> Self {
        self.config = config;
        self
    }

    /// The routing table
    pub fn decide(launch_state: LaunchState, has_session: bool) -> Destination {
        match (launch_state, has_session) {
            (LaunchState::FirstLaunch, _) => Destination::Onboarding,
            (LaunchState::ReturningUser, true) => Destination::Home,
            (LaunchState::ReturningUser, false) => Destination::Login,
        }
    }

    /// Resolve the destination.
    ///
    /// Completes no earlier than the minimum splash duration and no later
    /// than the slower of the timer and the check.
    pub async fn resolve(&self) -> Result<Destination> {
        self.resolve_outcome().await.map(|outcome| outcome.destination)
    }

    /// Resolve the destination together with its deferred side effect
    pub async fn resolve_outcome(&self) -> Result<RouterOutcome> {
        let min_delay = tokio::time::sleep(self.config.min_splash_duration);
        let mut check = CheckTask(tokio::spawn(check_destination(
            Arc::clone(&self.preferences),
            self.auth.clone(),
        )));

        let ((), checked) = tokio::join!(min_delay, &mut check.0);
        let destination = settle_check(checked)?;

        tracing::info!(%destination, "splash resolved");
        Ok(RouterOutcome::for_destination(destination))
    }

    /// Resolve in a background task and publish the result once.
    ///
    /// Dropping the returned handle cancels the resolution.
    pub fn launch(self: Arc<Self>) -> SplashHandle {
        let (tx, rx) = watch::channel(None);

        let task = tokio::spawn(async move {
            match self.resolve().await {
                Ok(destination) => {
                    tx.send_replace(Some(destination));
                }
                Err(StartupError::Cancelled) => {
                    tracing::debug!("splash resolution cancelled");
                }
            }
        });

        SplashHandle { destination: rx, task: Some(task) }
    }
}

async fn check_destination(
    preferences: Arc<dyn PreferenceStore>,
    auth: Option<Arc<dyn AuthProvider>>,
) -> Destination {
    let first_launch = match preferences.read_first_launch().await {
        Ok(first_launch) => first_launch,
        Err(e) => {
            tracing::error!(error = %e, "Error reading preferences, falling back to login");
            return Destination::Login;
        }
    };

    let session = match &auth {
        Some(auth) => auth.current_session().await,
        None => None,
    };

    let auth_state = if auth.is_some() { "ready" } else { "unavailable" };
    let user = session.as_ref().map(|s| s.uid()).unwrap_or("logged out");
    tracing::debug!(first_launch, auth = auth_state, user, "splash inputs");

    StartupRouter::decide(LaunchState::from_first_launch(first_launch), session.is_some())
}

/// Map the joined check task to a destination. Cancellation from outside
/// is propagated; a panic degrades to `Login`.
fn settle_check(checked: std::result::Result<Destination, JoinError>) -> Result<Destination> {
    match checked {
        Ok(destination) => Ok(destination),
        Err(e) if e.is_cancelled() => Err(StartupError::Cancelled),
        Err(e) => {
            tracing::error!(error = %e, "Startup check failed, falling back to login");
            Ok(Destination::Login)
        }
    }
}

/// Aborts the check task if resolution is dropped before it joins
struct CheckTask(JoinHandle<Destination>);

impl Drop for CheckTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Handle to a running splash resolution
///
/// The destination is `None` until resolved and is set at most once.
pub struct SplashHandle {
    destination: watch::Receiver<Option<Destination>>,
    task: Option<JoinHandle<()>>,
}

impl SplashHandle {
    /// Resolved destination, if any yet
    pub fn destination(&self) -> Option<Destination> {
        *self.destination.borrow()
    }

    /// Observe the destination as it resolves
    pub fn subscribe(&self) -> watch::Receiver<Option<Destination>> {
        self.destination.clone()
    }

    /// Wait for the destination; `None` if resolution was cancelled
    pub async fn wait(&mut self) -> Option<Destination> {
        match self.destination.wait_for(Option::is_some).await {
            Ok(destination) => *destination,
            Err(_) => None,
        }
    }

    /// Cancel the resolution and wait for the task to stop
    pub async fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for SplashHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
