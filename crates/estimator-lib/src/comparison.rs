//! Side-by-side baseline estimates for reference source configurations
//!
//! Each row answers "what would a baseline migration of this size cost",
//! using fixed-minimum sizing (no spike or write-heavy multipliers), the
//! default instance selection and storage sized to the source data.

use crate::catalog::{Catalog, CatalogWarning};
use crate::cost::aggregate;
use crate::error::Result;
use crate::models::{
    InstanceSelection, OperationalConfig, Payback, ReadWriteRatio, SourceProfile, StorageConfig,
    TargetTopology, TierStorage, WorkloadProfile, WorkloadType,
};
use crate::topology::{derive_with_mode, SizingMode, COMPRESSION_RATIO};
use serde::{Deserialize, Serialize};

/// A source configuration with a display label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceProfile {
    pub label: String,
    pub source: SourceProfile,
}

/// Baseline estimate for one reference configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub label: String,
    pub source_instance_class: String,
    pub source_instance_count: u32,
    pub source_vcpu: u32,
    pub source_memory_gb: f64,
    pub storage_gb: f64,
    pub source_monthly_cost: f64,
    pub topology: TargetTopology,
    pub selection: InstanceSelection,
    pub target_monthly_cost: f64,
    pub savings_amount: f64,
    pub savings_percent: f64,
    pub payback: Payback,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<CatalogWarning>,
}

/// Workload assumed for every reference row
pub fn baseline_workload() -> WorkloadProfile {
    WorkloadProfile {
        read_write_ratio: ReadWriteRatio::R90W10,
        workload_type: WorkloadType::Oltp,
        concurrent_connections: 500,
        traffic_spikes: false,
        peak_to_normal_ratio: 1.0,
    }
}

/// Storage config with the storage tier volume sized to hold the source data
pub fn baseline_storage(source: &SourceProfile, topology: &TargetTopology) -> StorageConfig {
    let replicated_gb =
        source.storage_gb * COMPRESSION_RATIO * f64::from(topology.replication_factor);
    let per_node_gb = if topology.storage_nodes > 0 {
        (replicated_gb / f64::from(topology.storage_nodes)).ceil()
    } else {
        0.0
    };

    StorageConfig {
        storage: TierStorage::new(crate::catalog::DEFAULT_STORAGE_CLASS, per_node_gb)
            .with_local_instance_store(true),
        ..StorageConfig::default()
    }
}

/// Operational costs scaled to the source data size
pub fn baseline_operational(source: &SourceProfile) -> OperationalConfig {
    OperationalConfig {
        backup_size_gb: source.storage_gb * COMPRESSION_RATIO,
        ..OperationalConfig::default()
    }
}

/// Built-in reference configurations, smallest first
pub fn reference_profiles() -> Vec<ReferenceProfile> {
    let profile = |label: &str, class: &str, count: u32, storage_gb: f64, replicas: u32, writes: f64| {
        ReferenceProfile {
            label: label.to_string(),
            source: SourceProfile {
                instance_class: class.to_string(),
                instance_count: count,
                storage_gb,
                provisioned_iops: 3000.0,
                read_ops_per_sec: writes * 4.0,
                write_ops_per_sec: writes,
                // Priced from the catalog
                monthly_cost: 0.0,
                multi_az: true,
                read_replica_count: replicas,
            },
        }
    };

    vec![
        profile("Small", "db.r5.large", 1, 200.0, 0, 500.0),
        profile("Medium", "db.r5.xlarge", 1, 1000.0, 1, 2000.0),
        profile("Large", "db.r5.2xlarge", 2, 4000.0, 1, 8000.0),
        profile("X-Large", "db.r5.4xlarge", 2, 10_000.0, 2, 20_000.0),
        profile("Enterprise", "db.r5.8xlarge", 4, 40_000.0, 2, 60_000.0),
    ]
}

/// Baseline estimates for the given configurations
///
/// A profile with `monthly_cost == 0` is priced from the catalog.
pub fn compare(references: &[ReferenceProfile], catalog: &Catalog) -> Result<Vec<ComparisonRow>> {
    let workload = baseline_workload();

    references
        .iter()
        .map(|reference| {
            let source = &reference.source;
            let derivation = derive_with_mode(
                source,
                &workload,
                &TargetTopology::default(),
                &InstanceSelection::default(),
                catalog,
                SizingMode::Baseline,
            )?;
            let mut warnings = derivation.warnings;

            let source_monthly_cost = if source.monthly_cost > 0.0 {
                source.monthly_cost
            } else {
                source.estimate_monthly_cost(catalog, &mut warnings)
            };

            let aggregation = aggregate(
                &derivation.topology,
                &derivation.selection,
                &baseline_storage(source, &derivation.topology),
                &baseline_operational(source),
                source_monthly_cost,
                catalog,
            );
            warnings.extend(aggregation.warnings);
            warnings.sort();
            warnings.dedup();

            let spec = catalog.resolve_instance(&source.instance_class, &mut Vec::new());
            let summary = aggregation.summary;

            Ok(ComparisonRow {
                label: reference.label.clone(),
                source_instance_class: source.instance_class.clone(),
                source_instance_count: source.instance_count,
                source_vcpu: spec.compute_units,
                source_memory_gb: spec.memory_gb,
                storage_gb: source.storage_gb,
                source_monthly_cost,
                topology: derivation.topology,
                selection: derivation.selection,
                target_monthly_cost: summary.total_monthly_cost,
                savings_amount: summary.savings_amount,
                savings_percent: summary.savings_percent,
                payback: summary.payback,
                warnings,
            })
        })
        .collect()
}

/// Baseline estimates for the built-in reference set
pub fn compare_reference_set(catalog: &Catalog) -> Result<Vec<ComparisonRow>> {
    compare(&reference_profiles(), catalog)
}
