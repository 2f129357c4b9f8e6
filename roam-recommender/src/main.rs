//! roam-recommender service entry point.

use anyhow::{Context, Result};
use roam_common::config::Config;
use roam_common::logging::init_logging_with_exclusions;
use roam_recommender::{
    build_router, AppState, CachedScorer, DataSources, LexiconScorer, PolarityScorer, Recommender,
    RecommenderOptions,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    let config = Config::load_and_validate()?;
    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    tracing::info!("Roam Recommender v{}", env!("CARGO_PKG_VERSION"));

    // Schema errors here are fatal: the service never becomes ready.
    let options = RecommenderOptions::from_config(&config);
    let sources = DataSources::from_config(&config.data);
    let (dining, attractions) = sources.load(&options.rules)?;

    let scorer: Arc<dyn PolarityScorer> = Arc::new(CachedScorer::new(
        LexiconScorer::new(),
        config.recommender.scorer_cache_capacity,
    ));
    let recommender = Recommender::build(&dining, &attractions, scorer, options)?;

    let state = AppState::new(recommender, sources);

    // Build router with CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state).layer(cors);

    let addr = config.bind_address();

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
