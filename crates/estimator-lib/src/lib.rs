//! Migration cost estimator library
//!
//! This crate provides the core functionality for:
//! - Instance and storage pricing catalogs
//! - Deriving a distributed SQL target topology from a source database
//! - Monthly cost breakdowns, savings and payback
//! - A bounded history of source instance class changes
//! - Baseline comparisons across reference configurations
//! - Health checks and observability

pub mod catalog;
pub mod comparison;
pub mod cost;
pub mod engine;
pub mod error;
pub mod health;
pub mod history;
pub mod models;
pub mod observability;
pub mod session;
pub mod storage_cost;
pub mod topology;
pub mod validation;

pub use catalog::{Catalog, CatalogWarning, InstanceSpec, StoragePricing, StoragePricingRule};
pub use comparison::{compare, compare_reference_set, ComparisonRow, ReferenceProfile};
pub use engine::{recompute, ProfileSnapshot, RecomputeRequest, RecomputeResponse, Scenario};
pub use error::{EstimatorError, Result};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use history::{ChangeHistory, HistoryEntry};
pub use models::*;
pub use observability::{EstimatorMetrics, StructuredLogger};
pub use session::EstimatorSession;

#[cfg(test)]
mod tests;
