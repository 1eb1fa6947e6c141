//! HTTP API for estimates, comparison, health checks and Prometheus metrics

use estimator_lib::{
    compare_reference_set,
    health::{components, ComponentStatus, HealthRegistry},
    Catalog, ChangeHistory, ComparisonRow, EstimatorError, EstimatorSession, InstanceSelection,
    RecomputeResponse, Scenario, SourceProfile, WorkloadProfile,
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub catalog: Arc<Catalog>,
    /// One recompute plus its history append runs under this lock
    pub session: Mutex<EstimatorSession>,
    pub health_registry: HealthRegistry,
}

impl AppState {
    pub fn new(session: EstimatorSession, health_registry: HealthRegistry) -> Self {
        Self {
            catalog: session.shared_catalog(),
            session: Mutex::new(session),
            health_registry,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

/// Estimator error mapped onto an HTTP response
pub struct ApiError(EstimatorError);

impl From<EstimatorError> for ApiError {
    fn from(err: EstimatorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            EstimatorError::InvalidConfiguration { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_configuration")
            }
            EstimatorError::CatalogLoad(_) => (StatusCode::INTERNAL_SERVER_ERROR, "catalog_load"),
            EstimatorError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io"),
            EstimatorError::Serialization(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "serialization")
            }
        };
        if status.is_server_error() {
            error!(error = %self.0, "Estimator request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}

/// Reflect the latest estimate in component health
async fn record_outcome(registry: &HealthRegistry, response: &RecomputeResponse) {
    registry.set_healthy(components::ENGINE).await;
    if response.warnings.is_empty() {
        registry.set_healthy(components::CATALOG).await;
    } else {
        registry
            .set_degraded(
                components::CATALOG,
                format!("{} catalog fallback(s) in last estimate", response.warnings.len()),
            )
            .await;
    }
}

/// Apply one edit to the session and return the new estimate
async fn apply_edit<F>(state: &AppState, edit: F) -> Result<Json<RecomputeResponse>, ApiError>
where
    F: FnOnce(&mut EstimatorSession) -> estimator_lib::Result<RecomputeResponse>,
{
    let response = {
        let mut session = state.session.lock().await;
        edit(&mut *session)?
    };
    record_outcome(&state.health_registry, &response).await;
    Ok(Json(response))
}

/// Current estimate, computing it on first use
async fn get_estimate(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecomputeResponse>, ApiError> {
    apply_edit(&state, |session| match session.last() {
        Some(last) => Ok(last.clone()),
        None => session.recompute().cloned(),
    })
    .await
}

async fn put_scenario(
    State(state): State<Arc<AppState>>,
    Json(scenario): Json<Scenario>,
) -> Result<Json<RecomputeResponse>, ApiError> {
    apply_edit(&state, |session| session.update_scenario(scenario).cloned()).await
}

async fn put_source(
    State(state): State<Arc<AppState>>,
    Json(source): Json<SourceProfile>,
) -> Result<Json<RecomputeResponse>, ApiError> {
    apply_edit(&state, |session| session.update_source(source).cloned()).await
}

async fn put_workload(
    State(state): State<Arc<AppState>>,
    Json(workload): Json<WorkloadProfile>,
) -> Result<Json<RecomputeResponse>, ApiError> {
    apply_edit(&state, |session| session.update_workload(workload).cloned()).await
}

/// Manual instance class override
async fn put_selection(
    State(state): State<Arc<AppState>>,
    Json(selection): Json<InstanceSelection>,
) -> Result<Json<RecomputeResponse>, ApiError> {
    apply_edit(&state, |session| session.override_selection(selection).cloned()).await
}

async fn get_history(State(state): State<Arc<AppState>>) -> Json<ChangeHistory> {
    Json(state.session.lock().await.history().clone())
}

async fn delete_history(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.lock().await.clear_history();
    info!("Change history cleared");
    StatusCode::NO_CONTENT
}

async fn get_comparison(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ComparisonRow>>, ApiError> {
    Ok(Json(compare_reference_set(&state.catalog)?))
}

async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<Catalog> {
    Json(state.catalog.as_ref().clone())
}

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/estimate", get(get_estimate))
        .route("/api/v1/scenario", put(put_scenario))
        .route("/api/v1/source", put(put_source))
        .route("/api/v1/workload", put(put_workload))
        .route("/api/v1/selection", put(put_selection))
        .route("/api/v1/history", get(get_history).delete(delete_history))
        .route("/api/v1/comparison", get(get_comparison))
        .route("/api/v1/catalog", get(get_catalog))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
