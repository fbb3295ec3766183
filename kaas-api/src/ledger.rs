//! Health ledger backed by PostgreSQL
//!
//! One row per application with cumulative probe counts. Writes go to the
//! primary, point reads to the replica when one is configured.

use chrono::{DateTime, Utc};
use kaas_common::HealthRecord;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::log_db_operation;

pub const HEALTH_TABLE: &str = "health_status";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS health_status (
    app_name TEXT PRIMARY KEY,
    failure_count INTEGER NOT NULL DEFAULT 0,
    success_count INTEGER NOT NULL DEFAULT 0,
    last_failure TIMESTAMPTZ NULL,
    last_success TIMESTAMPTZ NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

const RECORD_SUCCESS: &str = "INSERT INTO health_status (app_name, success_count, last_success)
     VALUES ($1, 1, $2)
     ON CONFLICT (app_name) DO UPDATE
     SET success_count = health_status.success_count + 1,
         last_success = EXCLUDED.last_success";

const RECORD_FAILURE: &str = "INSERT INTO health_status (app_name, failure_count, last_failure)
     VALUES ($1, 1, $2)
     ON CONFLICT (app_name) DO UPDATE
     SET failure_count = health_status.failure_count + 1,
         last_failure = EXCLUDED.last_failure";

const READ_RECORD: &str = "SELECT app_name, failure_count, success_count, last_failure, last_success, created_at
     FROM health_status WHERE app_name = $1";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to create health table: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("Failed to record probe result for {app_name}: {source}")]
    Write {
        app_name: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to read health record for {app_name}: {source}")]
    Read {
        app_name: String,
        #[source]
        source: sqlx::Error,
    },
}

/// Probe result kinds the ledger counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    Success,
    Failure,
}

/// Health ledger pools
#[derive(Clone)]
pub struct HealthLedger {
    primary: PgPool,
    replica: PgPool,
}

impl HealthLedger {
    /// Build pools for the configured endpoints. Connections are opened on
    /// first use so an unreachable store does not stop the server starting.
    pub fn connect(config: &DatabaseConfig) -> Self {
        let options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout());

        let primary = options.clone().connect_lazy_with(config.primary.connect_options());
        let replica = match &config.replica {
            Some(endpoint) => options.connect_lazy_with(endpoint.connect_options()),
            None => primary.clone(),
        };

        tracing::info!(
            primary = %config.primary.host,
            replica = %config.read_endpoint().host,
            "Health ledger pools configured"
        );

        Self { primary, replica }
    }

    pub fn from_pools(primary: PgPool, replica: PgPool) -> Self {
        Self { primary, replica }
    }

    /// Create the health table if it does not exist
    pub async fn ensure_table(&self) -> Result<(), LedgerError> {
        log_db_operation!("create_table", HEALTH_TABLE);

        sqlx::query(CREATE_TABLE)
            .execute(&self.primary)
            .await
            .map_err(LedgerError::Schema)?;

        Ok(())
    }

    pub async fn record_success(&self, app_name: &str, at: DateTime<Utc>) -> Result<(), LedgerError> {
        self.record(app_name, ProbeResult::Success, at).await
    }

    pub async fn record_failure(&self, app_name: &str, at: DateTime<Utc>) -> Result<(), LedgerError> {
        self.record(app_name, ProbeResult::Failure, at).await
    }

    /// Single-statement upsert incrementing the matching counter
    pub async fn record(&self, app_name: &str, result: ProbeResult, at: DateTime<Utc>) -> Result<(), LedgerError> {
        let statement = match result {
            ProbeResult::Success => RECORD_SUCCESS,
            ProbeResult::Failure => RECORD_FAILURE,
        };
        log_db_operation!("upsert", HEALTH_TABLE, app_name);

        sqlx::query(statement)
            .bind(app_name)
            .bind(at)
            .execute(&self.primary)
            .await
            .map_err(|source| LedgerError::Write {
                app_name: app_name.to_string(),
                source,
            })?;

        Ok(())
    }

    /// Point lookup on the read pool
    pub async fn read(&self, app_name: &str) -> Result<Option<HealthRecord>, LedgerError> {
        log_db_operation!("select", HEALTH_TABLE, app_name);

        let read_error = |source: sqlx::Error| LedgerError::Read {
            app_name: app_name.to_string(),
            source,
        };

        let row = sqlx::query(READ_RECORD)
            .bind(app_name)
            .fetch_optional(&self.replica)
            .await
            .map_err(read_error)?;

        row.as_ref().map(row_to_record).transpose().map_err(read_error)
    }

    pub async fn close(&self) {
        self.primary.close().await;
        self.replica.close().await;
        tracing::info!("Health ledger pools closed");
    }
}

fn row_to_record(row: &PgRow) -> Result<HealthRecord, sqlx::Error> {
    Ok(HealthRecord {
        app_name: row.try_get("app_name")?,
        failure_count: row.try_get("failure_count")?,
        success_count: row.try_get("success_count")?,
        last_failure: row.try_get("last_failure")?,
        last_success: row.try_get("last_success")?,
        created_at: row.try_get("created_at")?,
    })
}

impl std::fmt::Debug for HealthLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthLedger")
            .field("primary_size", &self.primary.size())
            .field("replica_size", &self.replica.size())
            .finish()
    }
}
