//! HTTP routes
//!
//! Provisioning, status and health-ledger endpoints plus the API's own
//! liveness/readiness/startup probes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use kaas_common::{
    CompositeStatus, CreateApplicationRequest, CreateDatabaseServiceRequest, HealthReport, StatusMessage,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::status::{status_of, status_of_all, StatusLookup};

/// Build the full router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(provisioning_routes())
        .merge(status_routes())
        .merge(probe_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn provisioning_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/applications", post(create_application))
        .route("/postgres", post(create_postgres))
}

fn status_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/deployments/:namespace", get(list_deployment_statuses))
        .route("/deployments/:namespace/:app_name", get(get_deployment_status))
        .route("/health/:app_name", get(get_health_record))
}

fn probe_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(liveness_probe))
        .route("/ready", get(readiness_probe))
        .route("/startup", get(startup_probe))
}

// =============================================================================
// Provisioning
// =============================================================================

async fn create_application(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    let created = state.provisioner.provision_application(&request).await?;
    info!(app_name = %request.app_name, resources = created.len(), "Application created");

    Ok(Json(StatusMessage::new("Application created successfully")))
}

async fn create_postgres(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateDatabaseServiceRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    let created = state.provisioner.provision_database_service(&request).await?;
    info!(app_name = %request.app_name, resources = created.len(), "Postgres service created");

    Ok(Json(StatusMessage::new("Postgres service created successfully")))
}

// =============================================================================
// Status
// =============================================================================

async fn list_deployment_statuses(
    State(state): State<Arc<AppState>>,
    Path(namespace): Path<String>,
) -> Result<Json<Vec<CompositeStatus>>, ApiError> {
    let statuses = status_of_all(state.cluster.as_ref(), &namespace).await?;
    Ok(Json(statuses))
}

async fn get_deployment_status(
    State(state): State<Arc<AppState>>,
    Path((namespace, app_name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let body = match status_of(state.cluster.as_ref(), &namespace, &app_name).await? {
        StatusLookup::Found(status) => serde_json::to_value(status),
        StatusLookup::NotFound { namespace, name } => {
            serde_json::to_value(StatusLookup::not_found_message(&namespace, &name))
        }
    }
    .map_err(|e| ApiError::Internal(format!("Failed to serialize status: {}", e)))?;

    Ok(Json(body))
}

async fn get_health_record(
    State(state): State<Arc<AppState>>,
    Path(app_name): Path<String>,
) -> Json<HealthReport> {
    let report = match state.ledger.read(&app_name).await {
        Ok(Some(record)) => HealthReport::Record(record),
        Ok(None) => HealthReport::missing(&app_name),
        Err(e) => {
            warn!(app_name = %app_name, error = %e, "Health ledger read failed");
            HealthReport::unhealthy(e.to_string())
        }
    };

    Json(report)
}

// =============================================================================
// Probes
// =============================================================================

async fn liveness_probe() -> Json<StatusMessage> {
    Json(StatusMessage::new("ok"))
}

async fn readiness_probe(State(state): State<Arc<AppState>>) -> Result<Json<StatusMessage>, ApiError> {
    let check = state.health.readiness(state.cluster.as_ref()).await;

    if check.is_healthy() {
        Ok(Json(StatusMessage::new("ok")))
    } else {
        warn!(reason = ?check.message, "Readiness check failed");
        Err(ApiError::ServiceUnavailable(check.message.unwrap_or_default()))
    }
}

async fn startup_probe(State(state): State<Arc<AppState>>) -> Result<Json<StatusMessage>, ApiError> {
    let check = state.health.startup(state.cluster.as_ref()).await;

    if check.is_healthy() {
        Ok(Json(StatusMessage::new("ok")))
    } else {
        warn!(reason = ?check.message, "Startup check failed");
        Err(ApiError::ServiceUnavailable(check.message.unwrap_or_default()))
    }
}
