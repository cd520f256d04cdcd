//! Onboarding carousel state
//!
//! The carousel walks the user through a short deck of slides. Finishing
//! ("Get Started") and skipping both end the flow the same way: the
//! first-launch flag is cleared and the user continues to sign-in.

use std::sync::Arc;
use storage::preferences::PreferenceStore;

use crate::startup::Destination;

/// One onboarding slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingSlide {
    /// Icon identifier
    pub icon: &'static str,
    /// First line of the title
    pub title_top: &'static str,
    /// Emphasized second line of the title
    pub title_highlight: &'static str,
    /// Body copy
    pub description: &'static str,
}

/// The default onboarding deck
pub fn default_slides() -> Vec<OnboardingSlide> {
    vec![
        OnboardingSlide {
            icon: "bolt",
            title_top: "Campus Services,",
            title_highlight: "Organised",
            description: "Find laundry, salon, tutoring, food and more from verified \
                          Meru University students. No WhatsApp groups.",
        },
        OnboardingSlide {
            icon: "forum",
            title_top: "Discover &",
            title_highlight: "Chat",
            description: "Find the services you need and message providers directly. \
                          Fast, easy, campus-first.",
        },
        OnboardingSlide {
            icon: "build",
            title_top: "Build Your",
            title_highlight: "Hustle",
            description: "Create your service profile, showcase your skills, and start \
                          earning on campus.",
        },
    ]
}

/// Result of pressing the primary button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerStep {
    /// Moved to the given page
    Moved(usize),
    /// Already on the last page; the flow should complete
    Finished,
}

/// Onboarding carousel state
pub struct OnboardingFlow {
    slides: Vec<OnboardingSlide>,
    current_page: usize,
    preferences: Arc<dyn PreferenceStore>,
}

impl OnboardingFlow {
    /// Create a flow over the default deck
    pub fn new(preferences: Arc<dyn PreferenceStore>) -> Self {
        Self::with_slides(preferences, default_slides())
    }

    /// Create a flow over a custom deck.
    ///
    /// An empty deck is treated as a single blank slide so the pager always
    /// has a page to show.
    pub fn with_slides(
        preferences: Arc<dyn PreferenceStore>,
        slides: Vec<OnboardingSlide>,
    ) -> Self {
        let slides = if slides.is_empty() {
            vec![OnboardingSlide { icon: "", title_top: "", title_highlight: "", description: "" }]
        } else {
            slides
        };

        Self { slides, current_page: 0, preferences }
    }

    /// Zero-based index of the visible page
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// The visible slide
    pub fn current_slide(&self) -> &OnboardingSlide {
        &self.slides[self.current_page]
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.slides.len()
    }

    /// Whether the first page is visible
    pub fn is_first_page(&self) -> bool {
        self.current_page == 0
    }

    /// Whether the last page is visible
    pub fn is_last_page(&self) -> bool {
        self.current_page + 1 == self.slides.len()
    }

    /// Label for the primary button
    pub fn primary_action_label(&self) -> &'static str {
        if self.is_last_page() {
            "Get Started"
        } else {
            "Next"
        }
    }

    /// Skip is offered everywhere except the last page
    pub fn can_skip(&self) -> bool {
        !self.is_last_page()
    }

    /// Press the primary button
    pub fn advance(&mut self) -> PagerStep {
        if self.is_last_page() {
            PagerStep::Finished
        } else {
            self.current_page += 1;
            PagerStep::Moved(self.current_page)
        }
    }

    /// Go back one page; `false` on the first page
    pub fn back(&mut self) -> bool {
        if self.is_first_page() {
            false
        } else {
            self.current_page -= 1;
            true
        }
    }

    /// Jump to a page (from a swipe); out-of-range pages are clamped
    pub fn go_to(&mut self, page: usize) {
        self.current_page = page.min(self.slides.len() - 1);
    }

    /// Finish or skip onboarding.
    ///
    /// Clears the first-launch flag on a best-effort basis and returns where
    /// to go next. A failed write is logged by the store and otherwise
    /// ignored, so onboarding shows again on the next launch.
    pub async fn complete(&self) -> Destination {
        if self.preferences.mark_first_launch_complete().await.is_ok() {
            tracing::info!(page = self.current_page, "onboarding complete");
        }
        Destination::Login
    }
}
