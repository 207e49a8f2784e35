/// External API clients module
use crate::config::AcquisitionSettings;
use crate::domain::{normalize_callsign, StateRecord};
use crate::errors::{ApiError, ApiResult};
use crate::utils::{num, text, unix_time};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("hawkeye/0.1")
            .build()?;
        Ok(Self { client })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }
}

/// OpenSky Network state vector client
pub struct OpenSkyClient {
    http_client: HttpClient,
    base_url: String,
    max_retries: u32,
    backoff: Duration,
}

impl OpenSkyClient {
    pub fn new(base_url: String, settings: &AcquisitionSettings) -> ApiResult<Self> {
        Ok(Self {
            http_client: HttpClient::new()?,
            base_url,
            max_retries: settings.max_retries,
            backoff: Duration::from_millis(settings.backoff_ms),
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch all current state vectors, retrying transient failures
    pub async fn fetch_states(&self) -> ApiResult<Vec<StateRecord>> {
        let mut attempt = 0;
        loop {
            match self.fetch_once().await {
                Ok(body) => {
                    let records = parse_states(&body, Utc::now());
                    debug!("OpenSky returned {} usable state vectors", records.len());
                    return Ok(records);
                }
                Err(e) if attempt < self.max_retries && is_transient(&e) => {
                    let delay = backoff_delay(self.backoff, attempt);
                    warn!(
                        "OpenSky fetch failed ({}), retry {}/{} in {:?}",
                        e,
                        attempt + 1,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self) -> ApiResult<Value> {
        let resp = self
            .http_client
            .get_client()
            .get(&self.base_url)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ApiError::UpstreamStatus(resp.status().as_u16()));
        }

        let json = resp.json().await?;
        Ok(json)
    }
}

fn is_transient(err: &ApiError) -> bool {
    match err {
        ApiError::ExternalApi(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        ApiError::UpstreamStatus(status) => {
            *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || (500..=599).contains(status)
        }
        _ => false,
    }
}

/// `base * 2^attempt`, capped to avoid overflow on large retry counts
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(16))
}

/// Map an OpenSky `/states/all` body to records, skipping rows without a position.
///
/// Each state is a positional array:
/// `[icao24, callsign, origin_country, time_position, last_contact, longitude,
///   latitude, baro_altitude, on_ground, velocity, true_track, vertical_rate, ...]`
pub fn parse_states(body: &Value, fallback_time: DateTime<Utc>) -> Vec<StateRecord> {
    let observed_at = unix_time(&body["time"]).unwrap_or(fallback_time);
    let Some(states) = body["states"].as_array() else {
        return Vec::new();
    };

    let records: Vec<StateRecord> = states
        .iter()
        .filter_map(|state| parse_state(state, observed_at))
        .collect();
    if records.len() < states.len() {
        debug!(
            "skipped {} state vectors without position",
            states.len() - records.len()
        );
    }
    records
}

fn parse_state(state: &Value, observed_at: DateTime<Utc>) -> Option<StateRecord> {
    let icao24 = text(&state[0]).filter(|s| !s.trim().is_empty())?;
    let longitude = num(&state[5])?;
    let latitude = num(&state[6])?;

    Some(StateRecord {
        icao24: icao24.trim().to_string(),
        callsign: normalize_callsign(text(&state[1])),
        origin_country: text(&state[2]),
        longitude: Some(longitude),
        latitude: Some(latitude),
        altitude_m: num(&state[7]),
        on_ground: state[8].as_bool().unwrap_or(false),
        velocity_mps: num(&state[9]),
        heading_deg: num(&state[10]),
        vertical_rate_mps: num(&state[11]),
        observed_at,
    })
}
