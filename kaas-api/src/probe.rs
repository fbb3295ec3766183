//! Workload reachability probe
//!
//! Run by the `kaas-probe` binary inside the scheduled job: one HTTP GET
//! against the workload's liveness URL, recorded in the health ledger.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::ledger::{HealthLedger, LedgerError, ProbeResult};

/// Outcome of a single probe
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub healthy: bool,
    pub at: DateTime<Utc>,
    pub duration_ms: u64,
    pub message: Option<String>,
}

impl ProbeOutcome {
    fn healthy(duration_ms: u64) -> Self {
        Self {
            healthy: true,
            at: Utc::now(),
            duration_ms,
            message: None,
        }
    }

    fn unhealthy(duration_ms: u64, message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            at: Utc::now(),
            duration_ms,
            message: Some(message.into()),
        }
    }

    pub fn result(&self) -> ProbeResult {
        if self.healthy {
            ProbeResult::Success
        } else {
            ProbeResult::Failure
        }
    }
}

/// GET `url`; only a 200 within `timeout_duration` counts as healthy
pub async fn probe_once(client: &reqwest::Client, url: &str, timeout_duration: Duration) -> ProbeOutcome {
    let start = Instant::now();

    let result = timeout(timeout_duration, client.get(url).send()).await;

    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(response)) if response.status() == StatusCode::OK => {
            debug!("Probe passed: {} returned 200", url);
            ProbeOutcome::healthy(duration_ms)
        }
        Ok(Ok(response)) => {
            let status = response.status().as_u16();
            warn!("Probe failed: {} returned {}", url, status);
            ProbeOutcome::unhealthy(duration_ms, format!("Unexpected status: {}", status))
        }
        Ok(Err(e)) => {
            warn!("Probe failed: {} - {}", url, e);
            ProbeOutcome::unhealthy(duration_ms, format!("Request failed: {}", e))
        }
        Err(_) => {
            warn!("Probe timed out: {}", url);
            ProbeOutcome::unhealthy(duration_ms, "Timeout")
        }
    }
}

/// Probe `url` and record the outcome for `app_name`.
///
/// Only the write itself can fail the run; the probe role may lack the
/// right to create tables, so schema errors are logged and skipped.
pub async fn run_probe(
    ledger: &HealthLedger,
    client: &reqwest::Client,
    app_name: &str,
    url: &str,
    timeout_duration: Duration,
) -> Result<ProbeOutcome, LedgerError> {
    let outcome = probe_once(client, url, timeout_duration).await;

    if let Err(e) = ledger.ensure_table().await {
        warn!(app_name, error = %e, "Could not ensure health table, recording anyway");
    }
    ledger.record(app_name, outcome.result(), outcome.at).await?;

    info!(
        app_name,
        url,
        healthy = outcome.healthy,
        duration_ms = outcome.duration_ms,
        "Probe recorded"
    );

    Ok(outcome)
}
