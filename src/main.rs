/// Aircraft threat assessment service entry point
mod clients;
mod config;
mod domain;
mod engine;
mod errors;
mod handlers;
mod repo;
mod routes;
mod services;
mod utils;

use crate::clients::OpenSkyClient;
use crate::config::{AcquisitionSettings, AppConfig};
use crate::engine::ThreatEngine;
use crate::handlers::AppState;
use crate::repo::{init_db, StateRepo};
use crate::routes::build_router;
use crate::services::{AcquisitionService, AssessmentService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load and validate configuration before anything else runs
    let config = AppConfig::from_env()?;
    info!(
        "Configuration loaded: {} zones, {} pattern groups",
        config.engine.zones.len(),
        config.engine.patterns.len()
    );
    let engine = ThreatEngine::new(config.engine.clone())?;

    // Initialize database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    info!("Database connection pool established");

    init_db(&pool).await?;
    info!("Database schema initialized");

    let repo = StateRepo::new(pool.clone());
    let client = OpenSkyClient::new(config.opensky_url.clone(), &config.acquisition)?;

    let acquisition = Arc::new(AcquisitionService::new(repo.clone(), client));
    let assessment = Arc::new(AssessmentService::new(repo, engine));

    let state = AppState {
        acquisition: acquisition.clone(),
        assessment,
    };

    start_acquisition_task(&config.acquisition, acquisition);

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("hawkeye listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Poll the feed with a fixed sleep between fetches; one request in flight at a time
fn start_acquisition_task(settings: &AcquisitionSettings, service: Arc<AcquisitionService>) {
    let interval = settings.poll_seconds;
    tokio::spawn(async move {
        info!("Starting aircraft collection task (interval: {}s)", interval);
        loop {
            if let Err(e) = service.fetch_and_store().await {
                error!("Aircraft fetch error: {:?}", e);
            }
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    });
}
