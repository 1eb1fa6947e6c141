//! Observability infrastructure for the estimator
//!
//! Provides:
//! - Prometheus metrics (recompute latency, recomputations, history size, last totals)
//! - Structured JSON logging with tracing

use crate::catalog::CatalogWarning;
use crate::history::HistoryEntry;
use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_gauge, Gauge,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for recompute latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<EstimatorMetricsInner> = OnceLock::new();

struct EstimatorMetricsInner {
    recompute_latency_seconds: Histogram,
    recomputations: IntCounter,
    invalid_configurations: IntCounter,
    catalog_fallbacks: IntCounter,
    history_entries: IntGauge,
    total_monthly_cost: Gauge,
    savings_amount: Gauge,
}

impl EstimatorMetricsInner {
    fn new() -> Self {
        Self {
            recompute_latency_seconds: register_histogram!(
                "estimator_recompute_latency_seconds",
                "Time spent deriving and pricing a target topology",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register recompute_latency_seconds"),

            recomputations: register_int_counter!(
                "estimator_recomputations_total",
                "Total number of successful recomputations"
            )
            .expect("Failed to register recomputations"),

            invalid_configurations: register_int_counter!(
                "estimator_invalid_configurations_total",
                "Total number of recomputations rejected for invalid input"
            )
            .expect("Failed to register invalid_configurations"),

            catalog_fallbacks: register_int_counter!(
                "estimator_catalog_fallbacks_total",
                "Total number of catalog misses resolved by a fallback"
            )
            .expect("Failed to register catalog_fallbacks"),

            history_entries: register_int_gauge!(
                "estimator_history_entries",
                "Number of entries in the change history"
            )
            .expect("Failed to register history_entries"),

            total_monthly_cost: register_gauge!(
                "estimator_total_monthly_cost",
                "Monthly cost of the most recently estimated target cluster"
            )
            .expect("Failed to register total_monthly_cost"),

            savings_amount: register_gauge!(
                "estimator_savings_amount",
                "Monthly savings of the most recent estimate against the source"
            )
            .expect("Failed to register savings_amount"),
        }
    }
}

/// Estimator metrics for Prometheus exposition
///
/// A lightweight handle to the global metrics instance. Clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct EstimatorMetrics {
    _private: (),
}

impl Default for EstimatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl EstimatorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(EstimatorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &EstimatorMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_recompute_latency(&self, duration_secs: f64) {
        self.inner().recompute_latency_seconds.observe(duration_secs);
    }

    pub fn inc_recomputations(&self) {
        self.inner().recomputations.inc();
    }

    pub fn inc_invalid_configurations(&self) {
        self.inner().invalid_configurations.inc();
    }

    pub fn add_catalog_fallbacks(&self, count: usize) {
        self.inner().catalog_fallbacks.inc_by(count as u64);
    }

    pub fn set_history_entries(&self, count: usize) {
        self.inner().history_entries.set(count as i64);
    }

    /// Record the totals of the latest estimate
    pub fn set_last_estimate(&self, total_monthly_cost: f64, savings_amount: f64) {
        self.inner().total_monthly_cost.set(total_monthly_cost);
        self.inner().savings_amount.set(savings_amount);
    }
}

/// Structured logger for estimator events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log a completed recomputation
    pub fn log_recompute(
        &self,
        source_class: &str,
        sql_nodes: u32,
        storage_nodes: u32,
        analytics_nodes: u32,
        total_monthly_cost: f64,
        savings_percent: f64,
        duration_secs: f64,
    ) {
        info!(
            event = "estimate_recomputed",
            instance = %self.instance,
            source_class = %source_class,
            sql_nodes = sql_nodes,
            storage_nodes = storage_nodes,
            analytics_nodes = analytics_nodes,
            total_monthly_cost = total_monthly_cost,
            savings_percent = savings_percent,
            duration_secs = duration_secs,
            "Recomputed migration estimate"
        );
    }

    /// Log a recorded source instance class transition
    pub fn log_instance_class_change(&self, entry: &HistoryEntry) {
        info!(
            event = "source_instance_class_changed",
            instance = %self.instance,
            sequence_id = entry.sequence_id,
            from = %entry.from_instance_class,
            to = %entry.to_instance_class,
            sql_nodes = %entry.sql_nodes_delta,
            storage_nodes = %entry.storage_nodes_delta,
            sql_class = %entry.instance_class_delta,
            resulting_monthly_cost = entry.resulting_monthly_cost,
            "Source instance class changed"
        );
    }

    pub fn log_catalog_fallback(&self, warning: &CatalogWarning) {
        warn!(
            event = "catalog_fallback",
            instance = %self.instance,
            warning = %warning,
            "Catalog key not found, using fallback"
        );
    }

    pub fn log_invalid_configuration(&self, error: &str) {
        warn!(
            event = "invalid_configuration",
            instance = %self.instance,
            error = %error,
            "Rejected estimator input"
        );
    }

    pub fn log_startup(&self, version: &str, catalog_version: &str) {
        info!(
            event = "estimator_started",
            instance = %self.instance,
            version = %version,
            catalog_version = %catalog_version,
            "Estimator started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "estimator_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Estimator shutting down"
        );
    }
}
