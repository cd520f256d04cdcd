//! Startup flow integration tests
//!
//! End-to-end launches against on-disk preference and session stores,
//! covering first launch, returning users and degraded storage.

use app_state::{
    provide_auth, AuthConfig, AuthProvider, Destination, OnboardingFlow, PagerStep, Session,
    SessionStore, StartupConfig, StartupRouter,
};
use app_ui::{NavGraph, Route};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use storage::{KvConfig, KvPreferenceStore, KvStore, PreferenceStore, IS_FIRST_LAUNCH_KEY};
use tempfile::TempDir;

/// One app process worth of collaborators
struct App {
    kv: KvStore,
    preferences: Arc<dyn PreferenceStore>,
    auth: Option<Arc<SessionStore>>,
}

impl App {
    async fn open(dir: &Path) -> Self {
        let kv = KvStore::new(KvConfig::new(dir.join("prefs")).flush_every_ms(None)).unwrap();
        let preferences = KvPreferenceStore::shared(kv.clone());
        let auth = provide_auth(&AuthConfig::new(dir.join("session.json"))).await;
        Self { kv, preferences, auth }
    }

    fn router(&self) -> StartupRouter {
        let auth = self.auth.clone().map(|a| a as Arc<dyn AuthProvider>);
        StartupRouter::new(Arc::clone(&self.preferences), auth)
            .with_config(StartupConfig::new().min_splash_duration(Duration::from_millis(20)))
    }

    async fn launch(&self) -> (Destination, NavGraph) {
        let destination = self.router().resolve().await.unwrap();
        let mut graph = NavGraph::new();
        assert!(graph.on_splash_resolved(destination));
        (destination, graph)
    }
}

/// Fresh install shows onboarding; finishing it routes to login for good
#[tokio::test]
async fn test_first_launch_then_relaunch() {
    let temp_dir = TempDir::new().unwrap();

    {
        let app = App::open(temp_dir.path()).await;
        let (destination, mut graph) = app.launch().await;
        assert_eq!(destination, Destination::Onboarding);
        assert_eq!(*graph.current_route(), Route::Onboarding);

        let mut flow = OnboardingFlow::new(Arc::clone(&app.preferences));
        while flow.advance() != PagerStep::Finished {}
        assert_eq!(flow.complete().await, Destination::Login);

        assert!(graph.on_onboarding_finished());
        assert_eq!(*graph.current_route(), Route::Login);
        assert!(!graph.can_go_back());
    }

    let app = App::open(temp_dir.path()).await;
    let (destination, graph) = app.launch().await;
    assert_eq!(destination, Destination::Login);
    assert_eq!(*graph.current_route(), Route::Login);
}

/// Onboarding abandoned mid-flow is shown again on the next launch
#[tokio::test]
async fn test_interrupted_onboarding_resumes() {
    let temp_dir = TempDir::new().unwrap();

    {
        let app = App::open(temp_dir.path()).await;
        let (destination, _graph) = app.launch().await;
        assert_eq!(destination, Destination::Onboarding);

        let mut flow = OnboardingFlow::new(Arc::clone(&app.preferences));
        flow.advance();
        // App killed here
    }

    let app = App::open(temp_dir.path()).await;
    let (destination, _graph) = app.launch().await;
    assert_eq!(destination, Destination::Onboarding);
}

/// A returning, signed-in user lands on home with no way back to the splash
#[tokio::test]
async fn test_returning_signed_in_user_goes_home() {
    let temp_dir = TempDir::new().unwrap();

    {
        let app = App::open(temp_dir.path()).await;
        app.preferences.mark_first_launch_complete().await.unwrap();
        app.auth
            .as_ref()
            .unwrap()
            .sign_in(Session::new("uid-42").with_email("otieno@students.must.ac.ke"))
            .await
            .unwrap();
    }

    let app = App::open(temp_dir.path()).await;
    let (destination, mut graph) = app.launch().await;
    assert_eq!(destination, Destination::Home);
    assert!(graph.current_route().requires_auth());
    assert!(!graph.go_back());
}

/// Signing out sends a returning user to login
#[tokio::test]
async fn test_signed_out_user_goes_to_login() {
    let temp_dir = TempDir::new().unwrap();
    let app = App::open(temp_dir.path()).await;
    app.preferences.mark_first_launch_complete().await.unwrap();

    let auth = app.auth.as_ref().unwrap();
    auth.sign_in(Session::new("uid-7")).await.unwrap();
    assert_eq!(app.launch().await.0, Destination::Home);

    auth.sign_out().await.unwrap();
    assert_eq!(app.launch().await.0, Destination::Login);
}

/// Unreadable session file means auth is unavailable, treated as signed out
#[tokio::test]
async fn test_unavailable_auth_routes_returning_user_to_login() {
    let temp_dir = TempDir::new().unwrap();
    tokio::fs::write(temp_dir.path().join("session.json"), "garbage").await.unwrap();

    let app = App::open(temp_dir.path()).await;
    assert!(app.auth.is_none());

    app.preferences.mark_first_launch_complete().await.unwrap();
    assert_eq!(app.launch().await.0, Destination::Login);
}

/// Unavailable auth never hides onboarding on a first launch
#[tokio::test]
async fn test_unavailable_auth_still_onboards() {
    let temp_dir = TempDir::new().unwrap();
    tokio::fs::write(temp_dir.path().join("session.json"), "garbage").await.unwrap();

    let app = App::open(temp_dir.path()).await;
    assert_eq!(app.launch().await.0, Destination::Onboarding);
}

/// A malformed first-launch flag fails safe to login even with a session
#[tokio::test]
async fn test_corrupt_preference_fails_safe_to_login() {
    let temp_dir = TempDir::new().unwrap();
    let app = App::open(temp_dir.path()).await;

    app.auth.as_ref().unwrap().sign_in(Session::new("uid-9")).await.unwrap();
    app.kv.set(IS_FIRST_LAUNCH_KEY, &"maybe").unwrap();

    assert_eq!(app.launch().await.0, Destination::Login);
}

/// The splash handle publishes the same destination the router resolves
#[tokio::test]
async fn test_splash_handle_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let app = App::open(temp_dir.path()).await;

    let mut splash = Arc::new(app.router()).launch();
    let destination = splash.wait().await.unwrap();

    let mut graph = NavGraph::new();
    assert!(graph.on_splash_resolved(destination));
    assert_eq!(*graph.current_route(), Route::Onboarding);
    assert_eq!(splash.destination(), Some(Destination::Onboarding));
}
