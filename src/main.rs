//! Headless HustleHub shell
//!
//! Runs one app launch: resolves the splash destination, follows it through
//! the navigation graph and, on a first launch, walks the onboarding deck.

mod config;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use app_state::{
    provide_auth, AuthConfig, AuthProvider, Destination, OnboardingFlow, PagerStep, StartupConfig,
    StartupRouter,
};
use app_ui::NavGraph;
use config::AppConfig;
use storage::{KvConfig, KvPreferenceStore, KvStore};

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "starting");

    let kv = KvStore::new(KvConfig::new(config.preferences_path()))
        .with_context(|| format!("opening preferences in {}", config.data_dir.display()))?;
    let preferences = KvPreferenceStore::shared(kv);
    let auth = provide_auth(&AuthConfig::new(config.session_path()))
        .await
        .map(|store| store as Arc<dyn AuthProvider>);

    let router = Arc::new(
        StartupRouter::new(Arc::clone(&preferences), auth).with_config(
            StartupConfig::new().min_splash_duration(config.min_splash_duration),
        ),
    );

    let mut splash = router.launch();
    let destination = tokio::select! {
        destination = splash.wait() => destination,
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(destination) = destination else {
        tracing::info!("startup cancelled");
        return Ok(());
    };

    let mut graph = NavGraph::new();
    graph.on_splash_resolved(destination);
    println!("-> {}", graph.current_route().to_path());

    if destination == Destination::Onboarding {
        let mut onboarding = OnboardingFlow::new(preferences);
        loop {
            let slide = onboarding.current_slide();
            println!(
                "   [{}/{}] {} {}: {}",
                onboarding.current_page() + 1,
                onboarding.page_count(),
                slide.title_top,
                slide.title_highlight,
                slide.description
            );
            if onboarding.advance() == PagerStep::Finished {
                break;
            }
        }

        onboarding.complete().await;
        graph.on_onboarding_finished();
        println!("-> {}", graph.current_route().to_path());
    }

    Ok(())
}
