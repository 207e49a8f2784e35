/// Repository layer for database operations
use crate::domain::{CountryCount, LogStats, StateRecord};
use crate::engine::StreamVersion;
use crate::errors::ApiResult;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

const STATES_TABLE: &str = "aircraft_states";

// Postgres caps bind parameters at 65535 per statement
const INSERT_CHUNK: usize = 4000;

/// Append-only log of aircraft state vectors
#[derive(Clone)]
pub struct StateRepo {
    pool: PgPool,
}

impl StateRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append records, returning the number of rows written
    pub async fn append(&self, records: &[StateRecord]) -> ApiResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;
        for chunk in records.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO aircraft_states (observed_at, icao24, callsign, origin_country,
                 longitude, latitude, altitude_m, on_ground, velocity_mps, heading_deg,
                 vertical_rate_mps) ",
            );
            builder.push_values(chunk, |mut row, r| {
                row.push_bind(r.observed_at)
                    .push_bind(&r.icao24)
                    .push_bind(&r.callsign)
                    .push_bind(&r.origin_country)
                    .push_bind(r.longitude)
                    .push_bind(r.latitude)
                    .push_bind(r.altitude_m)
                    .push_bind(r.on_ground)
                    .push_bind(r.velocity_mps)
                    .push_bind(r.heading_deg)
                    .push_bind(r.vertical_rate_mps);
            });
            written += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(written)
    }

    /// Records observed at or after `cutoff`, oldest first, insertion order within a timestamp
    pub async fn load_since(&self, cutoff: DateTime<Utc>) -> ApiResult<Vec<StateRecord>> {
        let rows = sqlx::query_as::<_, StateRecord>(
            "SELECT icao24, callsign, origin_country, longitude, latitude, altitude_m,
                    on_ground, velocity_mps, heading_deg, vertical_rate_mps, observed_at
             FROM aircraft_states
             WHERE observed_at >= $1
             ORDER BY observed_at, id",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Newest observation time in the log
    pub async fn latest_observed_at(&self) -> ApiResult<Option<DateTime<Utc>>> {
        let row = sqlx::query_as::<_, (Option<DateTime<Utc>>,)>(
            "SELECT max(observed_at) FROM aircraft_states",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    /// Current version of the stream; changes on every append
    pub async fn stream_version(&self) -> ApiResult<StreamVersion> {
        // Append-only with a serial key, so the max id alone tracks every write
        let (last_id,) = sqlx::query_as::<_, (i64,)>(
            "SELECT COALESCE(max(id), 0)::BIGINT FROM aircraft_states",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StreamVersion {
            source: STATES_TABLE.to_string(),
            last_id,
        })
    }

    /// Totals over the whole log
    pub async fn stats(&self, top_n: i64) -> ApiResult<LogStats> {
        let (total_records, unique_aircraft, first_observed_at, last_observed_at) =
            sqlx::query_as::<_, (i64, i64, Option<DateTime<Utc>>, Option<DateTime<Utc>>)>(
                "SELECT count(*), count(DISTINCT icao24), min(observed_at), max(observed_at)
                 FROM aircraft_states",
            )
            .fetch_one(&self.pool)
            .await?;

        let top = sqlx::query_as::<_, (String, i64)>(
            "SELECT origin_country, count(*) AS n
             FROM aircraft_states
             WHERE origin_country IS NOT NULL
             GROUP BY origin_country
             ORDER BY n DESC, origin_country
             LIMIT $1",
        )
        .bind(top_n)
        .fetch_all(&self.pool)
        .await?;

        Ok(LogStats {
            total_records,
            unique_aircraft,
            first_observed_at,
            last_observed_at,
            top_countries: top
                .into_iter()
                .map(|(country, count)| CountryCount {
                    country,
                    count: count.max(0) as usize,
                })
                .collect(),
        })
    }
}

/// Initialize database tables
pub async fn init_db(pool: &PgPool) -> ApiResult<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS aircraft_states(
            id BIGSERIAL PRIMARY KEY,
            observed_at TIMESTAMPTZ NOT NULL,
            icao24 TEXT NOT NULL,
            callsign TEXT,
            origin_country TEXT,
            longitude DOUBLE PRECISION,
            latitude DOUBLE PRECISION,
            altitude_m DOUBLE PRECISION,
            on_ground BOOLEAN NOT NULL DEFAULT false,
            velocity_mps DOUBLE PRECISION,
            heading_deg DOUBLE PRECISION,
            vertical_rate_mps DOUBLE PRECISION
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS ix_aircraft_states_observed_at
         ON aircraft_states(observed_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS ix_aircraft_states_icao24
         ON aircraft_states(icao24, observed_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
