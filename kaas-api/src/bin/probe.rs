//! kaas health probe
//!
//! Runs once per scheduled job: probes `KAAS_PROBE_URL` and records the
//! outcome for `KAAS_PROBE_APP_NAME` in the health ledger. An unhealthy
//! target is a normal outcome; only a failed ledger write exits non-zero.

use std::time::Duration;

use anyhow::Context;
use kaas_api::config::KaasConfig;
use kaas_api::ledger::HealthLedger;
use kaas_api::{logging, probe};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = KaasConfig::load().context("Failed to load configuration")?;

    let _log_guard = logging::init(&config.logging, "kaas-probe")
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let app_name = std::env::var("KAAS_PROBE_APP_NAME").context("KAAS_PROBE_APP_NAME is not set")?;
    let url = std::env::var("KAAS_PROBE_URL").context("KAAS_PROBE_URL is not set")?;
    let timeout = Duration::from_secs(config.probe.timeout_secs);

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let ledger = HealthLedger::connect(&config.database);
    let result = probe::run_probe(&ledger, &client, &app_name, &url, timeout).await;
    ledger.close().await;

    let outcome = result.context("Failed to record probe result")?;
    if let Some(message) = outcome.message {
        tracing::info!(app_name = %app_name, "Target unhealthy: {}", message);
    }

    Ok(())
}
