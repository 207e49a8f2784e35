/// Business logic services layer
use crate::clients::OpenSkyClient;
use crate::domain::{AssessmentReport, ClusterCheck, LogStats, TrafficSummary};
use crate::engine::patterns::check_cluster;
use crate::engine::summary::{summarize, DEFAULT_TOP_COUNTRIES};
use crate::engine::{ReportCache, ThreatEngine};
use crate::errors::{ApiError, ApiResult};
use crate::repo::StateRepo;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// At most one acquisition runs at a time
#[derive(Debug, Default)]
struct InFlight(Mutex<()>);

impl InFlight {
    /// Wait for the running acquisition, if any, to finish
    async fn wait(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }

    /// Enter only if nothing is running
    fn try_enter(&self) -> ApiResult<MutexGuard<'_, ()>> {
        self.0.try_lock().map_err(|_| ApiError::AcquisitionInProgress)
    }
}

/// Polls the tracking feed and appends to the log
pub struct AcquisitionService {
    repo: StateRepo,
    client: OpenSkyClient,
    in_flight: InFlight,
}

impl AcquisitionService {
    pub fn new(repo: StateRepo, client: OpenSkyClient) -> Self {
        Self {
            repo,
            client,
            in_flight: InFlight::default(),
        }
    }

    /// Fetch one snapshot and store it, queueing behind a running acquisition
    pub async fn fetch_and_store(&self) -> ApiResult<u64> {
        let _guard = self.in_flight.wait().await;
        self.store_snapshot().await
    }

    /// Same as [`AcquisitionService::fetch_and_store`], but refuses while one is running
    pub async fn try_fetch_and_store(&self) -> ApiResult<u64> {
        let _guard = self.in_flight.try_enter()?;
        self.store_snapshot().await
    }

    async fn store_snapshot(&self) -> ApiResult<u64> {
        let records = self.client.fetch_states().await?;
        if records.is_empty() {
            debug!("no state vectors from {}", self.client.base_url());
            return Ok(0);
        }
        let written = self.repo.append(&records).await?;
        info!("Saved {} aircraft records", written);
        Ok(written)
    }
}

/// Runs the engine over the stored log, reusing the last report until the log changes
pub struct AssessmentService {
    repo: StateRepo,
    engine: ThreatEngine,
    cache: Mutex<ReportCache>,
}

impl AssessmentService {
    pub fn new(repo: StateRepo, engine: ThreatEngine) -> Self {
        Self {
            repo,
            engine,
            cache: Mutex::new(ReportCache::new()),
        }
    }

    pub fn engine(&self) -> &ThreatEngine {
        &self.engine
    }

    /// Report for the current stream version, recomputed only after an append
    pub async fn current_report(&self) -> ApiResult<Arc<AssessmentReport>> {
        // Held across the recompute so concurrent callers wait for one cycle
        let mut cache = self.cache.lock().await;
        let version = self.repo.stream_version().await?;
        if let Some(report) = cache.lookup(&version) {
            debug!("reusing report for {:?}", version);
            return Ok(report);
        }

        let records = match self.repo.latest_observed_at().await? {
            Some(latest) => {
                let reach = self.engine.loiter_lookback().max(self.engine.active_window());
                self.repo.load_since(latest - reach).await?
            }
            None => Vec::new(),
        };
        debug!("recomputing report over {} records", records.len());

        let report = self.engine.run_cycle(records, Utc::now());
        Ok(cache.store(version, report))
    }

    pub async fn summary(&self) -> ApiResult<TrafficSummary> {
        let report = self.current_report().await?;
        Ok(summarize(&report.aircraft, DEFAULT_TOP_COUNTRIES))
    }

    /// Density around any point over the current window
    pub async fn cluster_check(
        &self,
        lat: f64,
        lon: f64,
        radius_km: Option<f64>,
    ) -> ApiResult<ClusterCheck> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(ApiError::InvalidInput("lat and lon must be finite".to_string()));
        }
        if radius_km.is_some_and(|r| !r.is_finite() || r <= 0.0) {
            return Err(ApiError::InvalidInput("radius_km must be positive".to_string()));
        }
        let report = self.current_report().await?;
        Ok(check_cluster(&report.aircraft, lat, lon, radius_km))
    }

    pub async fn stats(&self) -> ApiResult<LogStats> {
        self.repo.stats(DEFAULT_TOP_COUNTRIES as i64).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_second_acquisition_refused_while_running() {
        let in_flight = InFlight::default();
        let running = in_flight.try_enter().unwrap();
        assert!(matches!(in_flight.try_enter(), Err(ApiError::AcquisitionInProgress)));
        drop(running);
        assert!(in_flight.try_enter().is_ok());
    }

    #[tokio::test]
    async fn test_waiting_acquisition_queues_behind_running_one() {
        let in_flight = InFlight::default();
        let running = in_flight.wait().await;
        let queued = tokio::time::timeout(Duration::from_millis(20), in_flight.wait()).await;
        assert!(queued.is_err());
        drop(running);
        let _next = in_flight.wait().await;
    }
}
