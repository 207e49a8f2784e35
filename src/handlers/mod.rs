/// HTTP request handlers
use crate::domain::{
    AssessmentReport, ClassifiedAircraft, ClusterCheck, Health, LogStats, ThreatZone,
    TrafficSummary, ZoneAssessment,
};
use crate::errors::ApiError;
use crate::services::{AcquisitionService, AssessmentService};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub acquisition: Arc<AcquisitionService>,
    pub assessment: Arc<AssessmentService>,
}

/// Successful response wrapper
#[derive(Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { ok: true, data }
    }
}

#[derive(Serialize)]
pub struct Written {
    pub written: u64,
}

#[derive(Serialize)]
pub struct Items<T: Serialize> {
    pub items: T,
}

#[derive(Debug, Deserialize)]
pub struct AircraftFilter {
    pub military: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ClusterQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: Option<f64>,
}

type Reply<T> = Result<Json<SuccessResponse<T>>, ApiError>;

/// Health check handler
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        now: Utc::now(),
    })
}

/// Trigger one acquisition, refused while the poller is mid-fetch
pub async fn trigger_fetch(State(state): State<AppState>) -> Reply<Written> {
    let written = state.acquisition.try_fetch_and_store().await?;
    Ok(Json(SuccessResponse::new(Written { written })))
}

/// Full report for the current window
pub async fn get_assessment(State(state): State<AppState>) -> Reply<AssessmentReport> {
    let report = state.assessment.current_report().await?;
    Ok(Json(SuccessResponse::new(report.as_ref().clone())))
}

/// Zone assessments only
pub async fn get_zone_assessments(
    State(state): State<AppState>,
) -> Reply<Items<Vec<ZoneAssessment>>> {
    let report = state.assessment.current_report().await?;
    Ok(Json(SuccessResponse::new(Items {
        items: report.zones.clone(),
    })))
}

/// One zone's assessment
pub async fn get_zone_assessment(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> Reply<ZoneAssessment> {
    let report = state.assessment.current_report().await?;
    let zone = report
        .zone(&name)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("zone {}", name)))?;
    Ok(Json(SuccessResponse::new(zone)))
}

/// Windowed aircraft, optionally filtered by military verdict
pub async fn get_aircraft(
    Query(filter): Query<AircraftFilter>,
    State(state): State<AppState>,
) -> Reply<Items<Vec<ClassifiedAircraft>>> {
    let report = state.assessment.current_report().await?;
    let items = report
        .aircraft
        .iter()
        .filter(|a| filter.military.map_or(true, |m| a.is_military == m))
        .cloned()
        .collect();
    Ok(Json(SuccessResponse::new(Items { items })))
}

/// Cluster check around an arbitrary point
pub async fn get_cluster_check(
    Query(query): Query<ClusterQuery>,
    State(state): State<AppState>,
) -> Reply<ClusterCheck> {
    let check = state
        .assessment
        .cluster_check(query.lat, query.lon, query.radius_km)
        .await?;
    Ok(Json(SuccessResponse::new(check)))
}

/// Traffic summary over the current window
pub async fn get_summary(State(state): State<AppState>) -> Reply<TrafficSummary> {
    let summary = state.assessment.summary().await?;
    Ok(Json(SuccessResponse::new(summary)))
}

/// Statistics over the stored log
pub async fn get_stats(State(state): State<AppState>) -> Reply<LogStats> {
    let stats = state.assessment.stats().await?;
    Ok(Json(SuccessResponse::new(stats)))
}

/// Configured zones
pub async fn list_zones(State(state): State<AppState>) -> Reply<Items<Vec<ThreatZone>>> {
    Ok(Json(SuccessResponse::new(Items {
        items: state.assessment.engine().zones().to_vec(),
    })))
}
