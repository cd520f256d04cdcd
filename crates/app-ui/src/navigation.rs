//! Navigation graph for HustleHub
//!
//! This module provides:
//! - Route definitions with stable paths
//! - A navigation stack with "pop up to" transitions
//! - The app navigation graph: splash, onboarding, login and home

use app_state::Destination;
use serde::{Deserialize, Serialize};

// =============================================================================
// Route Definitions
// =============================================================================

/// Route path constants
pub mod paths {
    /// Splash screen
    pub const SPLASH: &str = "splash";
    /// Home screen
    pub const HOME: &str = "home";
    /// Sign-in screen
    pub const LOGIN: &str = "login";
    /// Onboarding carousel
    pub const ONBOARDING: &str = "onboarding";
    /// Unknown path
    pub const NOT_FOUND: &str = "not-found";
}

/// All possible routes in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Splash screen shown while the startup destination resolves
    #[default]
    Splash,
    /// Onboarding carousel
    Onboarding,
    /// Sign-in screen
    Login,
    /// Home screen
    Home,
    /// Unknown path
    NotFound,
}

impl Route {
    /// Get the path for this route
    pub fn to_path(&self) -> &'static str {
        match self {
            Route::Splash => paths::SPLASH,
            Route::Onboarding => paths::ONBOARDING,
            Route::Login => paths::LOGIN,
            Route::Home => paths::HOME,
            Route::NotFound => paths::NOT_FOUND,
        }
    }

    /// Match a path to a route; leading slashes and query strings are ignored
    pub fn from_path(path: &str) -> Route {
        let path = path.split('?').next().unwrap_or_default().trim_matches('/');

        match path {
            paths::SPLASH => Route::Splash,
            paths::ONBOARDING => Route::Onboarding,
            paths::LOGIN => Route::Login,
            paths::HOME => Route::Home,
            _ => Route::NotFound,
        }
    }

    /// Check if this route requires authentication
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Home)
    }
}

impl From<Destination> for Route {
    fn from(destination: Destination) -> Self {
        match destination {
            Destination::Onboarding => Route::Onboarding,
            Destination::Login => Route::Login,
            Destination::Home => Route::Home,
        }
    }
}

// =============================================================================
// Navigation Stack
// =============================================================================

/// A navigation stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    /// The route
    pub route: Route,
    /// Unique key for this entry
    pub key: String,
}

impl StackEntry {
    /// Create a new stack entry
    pub fn new(route: Route) -> Self {
        Self { route, key: uuid::Uuid::new_v4().to_string() }
    }
}

/// Back stack of visited routes, never empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredStack")]
pub struct NavigationStack {
    /// Stack entries (bottom to top)
    entries: Vec<StackEntry>,
}

#[derive(Deserialize)]
struct StoredStack {
    entries: Vec<StackEntry>,
}

impl TryFrom<StoredStack> for NavigationStack {
    type Error = &'static str;

    fn try_from(stored: StoredStack) -> Result<Self, Self::Error> {
        if stored.entries.is_empty() {
            return Err("navigation stack must have at least one entry");
        }
        Ok(Self { entries: stored.entries })
    }
}

impl NavigationStack {
    /// Create a new navigation stack with a root route
    pub fn new(root: Route) -> Self {
        Self { entries: vec![StackEntry::new(root)] }
    }

    /// Push a route onto the stack
    pub fn push(&mut self, route: Route) {
        self.entries.push(StackEntry::new(route));
    }

    /// Pop the top route (returns true if popped, false if at root)
    pub fn pop(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }

    /// Push `route` after popping everything above the topmost `pop_up_to`
    /// entry, and that entry too when `inclusive`.
    ///
    /// When `pop_up_to` is not on the stack this is a plain push.
    pub fn navigate_pop_up_to(&mut self, route: Route, pop_up_to: Route, inclusive: bool) {
        if let Some(idx) = self.entries.iter().rposition(|e| e.route == pop_up_to) {
            let keep = if inclusive { idx } else { idx + 1 };
            self.entries.truncate(keep);
        }
        self.entries.push(StackEntry::new(route));
    }

    /// Get the current (top) route
    pub fn current(&self) -> &Route {
        &self.current_entry().route
    }

    /// Get the current stack entry
    pub fn current_entry(&self) -> &StackEntry {
        self.entries.last().expect("Stack should never be empty")
    }

    /// Whether `route` is anywhere in the back stack
    pub fn contains(&self, route: Route) -> bool {
        self.entries.iter().any(|e| e.route == route)
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    /// Get stack depth
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Get all entries
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }
}

// =============================================================================
// Navigation Graph
// =============================================================================

/// Animation type for navigation transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NavigationAnimation {
    /// Push animation (slide in from right)
    #[default]
    Push,
    /// Pop animation (slide out to right)
    Pop,
    /// Fade animation
    Fade,
    /// None (instant)
    None,
}

/// Pending navigation action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingNavigation {
    /// Target route
    pub route: Route,
    /// Animation type
    pub animation: NavigationAnimation,
}

/// The app navigation graph, starting at the splash screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavGraph {
    stack: NavigationStack,
    /// Pending navigation (for animations)
    #[serde(skip)]
    pub pending: Option<PendingNavigation>,
    splash_consumed: bool,
}

impl Default for NavGraph {
    fn default() -> Self {
        Self { stack: NavigationStack::new(Route::Splash), pending: None, splash_consumed: false }
    }
}

impl NavGraph {
    /// Create a graph at the splash screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current route
    pub fn current_route(&self) -> &Route {
        self.stack.current()
    }

    /// Back stack
    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    /// Leave the splash screen for the resolved destination.
    ///
    /// The splash entry is removed so back never returns to it. The
    /// destination is consumed once; later calls are ignored and return
    /// `false`.
    pub fn on_splash_resolved(&mut self, destination: Destination) -> bool {
        if self.splash_consumed || *self.stack.current() != Route::Splash {
            tracing::warn!(%destination, "ignoring splash destination outside the splash screen");
            return false;
        }

        self.splash_consumed = true;
        self.transition(Route::from(destination), Route::Splash, NavigationAnimation::Fade);
        true
    }

    /// Leave onboarding for sign-in, removing onboarding from history
    pub fn on_onboarding_finished(&mut self) -> bool {
        if *self.stack.current() != Route::Onboarding {
            return false;
        }

        self.transition(Route::Login, Route::Onboarding, NavigationAnimation::Push);
        true
    }

    /// Navigate to a route
    pub fn navigate(&mut self, route: Route) {
        self.pending = Some(PendingNavigation { route, animation: NavigationAnimation::Push });
        self.stack.push(route);
    }

    /// Go back
    pub fn go_back(&mut self) -> bool {
        if self.stack.pop() {
            self.pending = Some(PendingNavigation {
                route: *self.stack.current(),
                animation: NavigationAnimation::Pop,
            });
            true
        } else {
            false
        }
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        self.stack.can_go_back()
    }

    /// Complete the pending navigation
    pub fn complete_navigation(&mut self) {
        self.pending = None;
    }

    fn transition(&mut self, route: Route, pop_up_to: Route, animation: NavigationAnimation) {
        self.pending = Some(PendingNavigation { route, animation });
        self.stack.navigate_pop_up_to(route, pop_up_to, true);
    }
}

// =============================================================================
// Tests
// =============================================================================
