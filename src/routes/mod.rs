/// Application routes configuration
use crate::handlers::{
    get_aircraft, get_assessment, get_cluster_check, get_stats, get_summary, get_zone_assessment,
    get_zone_assessments, health, list_zones, trigger_fetch, AppState,
};
use axum::{routing::get, Router};

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Acquisition
        .route("/fetch", get(trigger_fetch))
        // Assessment endpoints
        .route("/assessment", get(get_assessment))
        .route("/assessment/zones", get(get_zone_assessments))
        .route("/assessment/zones/:name", get(get_zone_assessment))
        .route("/assessment/aircraft", get(get_aircraft))
        .route("/assessment/cluster", get(get_cluster_check))
        // Statistics
        .route("/summary", get(get_summary))
        .route("/stats", get(get_stats))
        // Configuration
        .route("/zones", get(list_zones))
        .with_state(state)
}
