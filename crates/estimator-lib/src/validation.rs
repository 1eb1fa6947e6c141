//! Precondition checks for estimator input
//!
//! Run before derivation. Failures surface as `InvalidConfiguration`.

use crate::error::{EstimatorError, Result};
use crate::models::{OperationalConfig, SourceProfile, StorageConfig, TierStorage, WorkloadProfile};

fn non_negative(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EstimatorError::invalid(field, format!("must be a non-negative number, got {}", value)))
    }
}

pub fn validate_source(source: &SourceProfile) -> Result<()> {
    if source.instance_count < 1 {
        return Err(EstimatorError::invalid(
            "source.instance_count",
            "must be at least 1",
        ));
    }
    if source.instance_class.is_empty() {
        return Err(EstimatorError::invalid("source.instance_class", "must not be empty"));
    }
    non_negative("source.storage_gb", source.storage_gb)?;
    non_negative("source.provisioned_iops", source.provisioned_iops)?;
    non_negative("source.read_ops_per_sec", source.read_ops_per_sec)?;
    non_negative("source.write_ops_per_sec", source.write_ops_per_sec)?;
    non_negative("source.monthly_cost", source.monthly_cost)
}

pub fn validate_workload(workload: &WorkloadProfile) -> Result<()> {
    if workload.concurrent_connections < 1 {
        return Err(EstimatorError::invalid(
            "workload.concurrent_connections",
            "must be at least 1",
        ));
    }
    if !workload.peak_to_normal_ratio.is_finite() || workload.peak_to_normal_ratio < 1.0 {
        return Err(EstimatorError::invalid(
            "workload.peak_to_normal_ratio",
            format!("must be at least 1, got {}", workload.peak_to_normal_ratio),
        ));
    }
    Ok(())
}

fn validate_tier(tier: &str, storage: &TierStorage) -> Result<()> {
    non_negative(&format!("storage.{}.size_gb", tier), storage.size_gb)?;
    non_negative(&format!("storage.{}.provisioned_iops", tier), storage.provisioned_iops)?;
    non_negative(
        &format!("storage.{}.provisioned_throughput_mbs", tier),
        storage.provisioned_throughput_mbs,
    )
}

pub fn validate_storage(storage: &StorageConfig) -> Result<()> {
    validate_tier("sql", &storage.sql)?;
    validate_tier("storage", &storage.storage)?;
    validate_tier("placement", &storage.placement)?;
    validate_tier("analytics", &storage.analytics)
}

pub fn validate_operational(operational: &OperationalConfig) -> Result<()> {
    non_negative("operational.backup_size_gb", operational.backup_size_gb)?;
    non_negative("operational.network_traffic_gb", operational.network_traffic_gb)?;
    non_negative(
        "operational.orchestration_cluster_monthly_cost",
        operational.orchestration_cluster_monthly_cost,
    )?;
    non_negative(
        "operational.orchestration_monitoring_monthly_cost",
        operational.orchestration_monitoring_monthly_cost,
    )?;
    non_negative(
        "operational.one_time_migration_cost",
        operational.one_time_migration_cost,
    )?;
    non_negative("operational.staff_fte", operational.staff_fte)
}
