//! kaas API server

use std::sync::Arc;

use anyhow::Context;
use kaas_api::config::KaasConfig;
use kaas_api::kubernetes::{ClusterApi, K8sClient};
use kaas_api::ledger::HealthLedger;
use kaas_api::shutdown::ShutdownCoordinator;
use kaas_api::{logging, routes, AppState};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = KaasConfig::load().context("Failed to load configuration")?;

    let _log_guard = logging::init(&config.logging, "kaas-api")
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting kaas API v{}", env!("CARGO_PKG_VERSION"));
    info!(namespace = %config.kubernetes.namespace, "Configuration loaded successfully");

    if config.postgres.uses_default_password() {
        warn!("Managed PostgreSQL services will use the default admin password; set KAAS_POSTGRES_ADMIN_PASSWORD");
    }

    let client = K8sClient::connect(config.kubernetes.context.as_deref())
        .await
        .context("Failed to create Kubernetes client")?;
    info!(api_server = %client.api_server(), "Kubernetes client configured");

    match client.get_version().await {
        Ok(version) => info!("Kubernetes version: {}", version),
        Err(e) => warn!("Kubernetes API not reachable yet: {}", e),
    }

    let ledger = HealthLedger::connect(&config.database);
    let cluster: Arc<dyn ClusterApi> = Arc::new(client);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(&config, cluster, ledger.clone()));
    let app = routes::build_router(state);

    let shutdown = ShutdownCoordinator::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { shutdown.wait_for_signal().await });
    }

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("kaas API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.signal())
        .await?;

    info!("Server stopped, running cleanup...");
    shutdown.cleanup(ledger.close()).await;
    info!("Cleanup complete, exiting");

    Ok(())
}
