//! Estimator service - migration cost estimates over HTTP
//!
//! Holds one estimator session and serves it together with the reference
//! comparison, the pricing catalog, health probes and Prometheus metrics.

use anyhow::Result;
use estimator_lib::{
    health::{components, HealthRegistry},
    observability::StructuredLogger,
    EstimatorSession,
};
use estimator_service::{api, config::ServiceConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting estimator-service");

    let config = ServiceConfig::load()?;
    info!(
        instance = %config.instance_name,
        api_port = config.api_port,
        catalog_path = ?config.catalog_path,
        "Service configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::CATALOG).await;
    health_registry.register(components::ENGINE).await;

    let catalog = Arc::new(config.load_catalog()?);
    let missing = catalog.missing_defaults();
    if !missing.is_empty() {
        warn!(missing = ?missing, "Catalog lacks default classes, fallbacks will apply");
        health_registry
            .set_degraded(
                components::CATALOG,
                format!("missing default classes: {}", missing.join(", ")),
            )
            .await;
    }

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(SERVICE_VERSION, &catalog.version);

    // Prime the session so the first GET is served from memory
    let mut session = EstimatorSession::new(catalog, logger.clone());
    if let Err(e) = session.recompute() {
        health_registry
            .set_unhealthy(components::ENGINE, format!("initial estimate failed: {}", e))
            .await;
    }

    let app_state = Arc::new(api::AppState::new(session, health_registry.clone()));
    health_registry.set_ready(true).await;

    let server = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = server => {
            logger.log_shutdown("API server exited");
            result??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
