//! Monthly cost model for the target cluster
//!
//! Prices a derived topology line by line and compares the total with what
//! the source deployment costs today.

use crate::catalog::{Catalog, CatalogWarning};
use crate::models::{
    CostBreakdown, CostSummary, InstanceSelection, OperationalConfig, Payback, StorageConfig,
    TargetTopology, TierStorage,
};
use crate::storage_cost::storage_cost_for_class;
use tracing::debug;

/// Object storage price per GB-month for backups
pub const BACKUP_PRICE_PER_GB: f64 = 0.023;

/// Egress price per GB
pub const NETWORK_PRICE_PER_GB: f64 = 0.01;

pub mod labels {
    pub const SQL_COMPUTE: &str = "SQL tier compute";
    pub const STORAGE_COMPUTE: &str = "Storage tier compute";
    pub const PLACEMENT_COMPUTE: &str = "Placement tier compute";
    pub const ANALYTICS_COMPUTE: &str = "Analytics tier compute";
    pub const MONITORING_COMPUTE: &str = "Monitoring instance";
    pub const SQL_STORAGE: &str = "SQL tier storage";
    pub const STORAGE_STORAGE: &str = "Storage tier storage";
    pub const PLACEMENT_STORAGE: &str = "Placement tier storage";
    pub const ANALYTICS_STORAGE: &str = "Analytics tier storage";
    pub const BACKUP: &str = "Backup";
    pub const NETWORK: &str = "Network egress";
    pub const ORCHESTRATION: &str = "Orchestration";
}

/// Priced cluster plus any catalog fallbacks hit while pricing
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub summary: CostSummary,
    pub warnings: Vec<CatalogWarning>,
}

fn tier_storage_cost(
    catalog: &Catalog,
    tier: &TierStorage,
    size_gb: f64,
    nodes: u32,
    warnings: &mut Vec<CatalogWarning>,
) -> f64 {
    let per_node = storage_cost_for_class(
        catalog,
        &tier.storage_class,
        size_gb,
        tier.provisioned_iops,
        tier.provisioned_throughput_mbs,
        warnings,
    );
    per_node * f64::from(nodes)
}

/// Savings percentage, 0 when the source costs nothing
pub fn savings_percent(savings_amount: f64, source_monthly_cost: f64) -> f64 {
    if source_monthly_cost > 0.0 {
        savings_amount / source_monthly_cost * 100.0
    } else {
        0.0
    }
}

/// Payback period, only defined for positive savings
pub fn payback(one_time_migration_cost: f64, savings_amount: f64) -> Payback {
    if savings_amount > 0.0 {
        Payback::Months(one_time_migration_cost / savings_amount)
    } else {
        Payback::NotApplicable
    }
}

/// Price the topology and compare it with the source deployment
pub fn aggregate(
    topology: &TargetTopology,
    selection: &InstanceSelection,
    storage: &StorageConfig,
    operational: &OperationalConfig,
    source_monthly_cost: f64,
    catalog: &Catalog,
) -> Aggregation {
    let mut warnings = Vec::new();
    let mut breakdown = CostBreakdown::new();

    let sql = catalog.resolve_instance(&selection.sql, &mut warnings);
    let storage_spec = catalog.resolve_instance(&selection.storage, &mut warnings);
    let placement = catalog.resolve_instance(&selection.placement, &mut warnings);
    let analytics = if topology.analytics_nodes > 0 {
        catalog.resolve_instance(&selection.analytics, &mut warnings).monthly_cost
    } else {
        0.0
    };
    let monitoring = catalog.resolve_instance(&selection.monitoring, &mut warnings);

    // Compute
    breakdown.push(labels::SQL_COMPUTE, sql.monthly_cost * f64::from(topology.sql_nodes));
    breakdown.push(
        labels::STORAGE_COMPUTE,
        storage_spec.monthly_cost * f64::from(topology.storage_nodes),
    );
    breakdown.push(
        labels::PLACEMENT_COMPUTE,
        placement.monthly_cost * f64::from(topology.placement_nodes),
    );
    breakdown.push(labels::ANALYTICS_COMPUTE, analytics * f64::from(topology.analytics_nodes));
    breakdown.push(labels::MONITORING_COMPUTE, monitoring.monthly_cost);

    // Block storage; local instance store covers part of the storage tier volume
    let storage_block_gb = match (storage.storage.use_local_instance_store, storage_spec.local_storage_gb) {
        (true, Some(local_gb)) => (storage.storage.size_gb - local_gb).max(0.0),
        _ => storage.storage.size_gb,
    };
    breakdown.push(
        labels::SQL_STORAGE,
        tier_storage_cost(catalog, &storage.sql, storage.sql.size_gb, topology.sql_nodes, &mut warnings),
    );
    breakdown.push(
        labels::STORAGE_STORAGE,
        tier_storage_cost(
            catalog,
            &storage.storage,
            storage_block_gb,
            topology.storage_nodes,
            &mut warnings,
        ),
    );
    breakdown.push(
        labels::PLACEMENT_STORAGE,
        tier_storage_cost(
            catalog,
            &storage.placement,
            storage.placement.size_gb,
            topology.placement_nodes,
            &mut warnings,
        ),
    );
    breakdown.push(
        labels::ANALYTICS_STORAGE,
        tier_storage_cost(
            catalog,
            &storage.analytics,
            storage.analytics.size_gb,
            topology.analytics_nodes,
            &mut warnings,
        ),
    );

    // Operations
    let backup = if operational.backup_enabled {
        operational.backup_size_gb * BACKUP_PRICE_PER_GB
    } else {
        0.0
    };
    breakdown.push(labels::BACKUP, backup);
    breakdown.push(labels::NETWORK, operational.network_traffic_gb * NETWORK_PRICE_PER_GB);
    breakdown.push(
        labels::ORCHESTRATION,
        f64::from(operational.orchestration_cluster_count) * operational.orchestration_cluster_monthly_cost
            + operational.orchestration_monitoring_monthly_cost,
    );

    let total_monthly_cost = breakdown.total();
    let savings_amount = source_monthly_cost - total_monthly_cost;
    let summary = CostSummary {
        total_monthly_cost,
        source_monthly_cost,
        savings_amount,
        savings_percent: savings_percent(savings_amount, source_monthly_cost),
        payback: payback(operational.one_time_migration_cost, savings_amount),
        breakdown,
    };

    debug!(
        total_monthly_cost = summary.total_monthly_cost,
        source_monthly_cost = summary.source_monthly_cost,
        savings_amount = summary.savings_amount,
        savings_percent = summary.savings_percent,
        "Aggregated target cost"
    );

    Aggregation { summary, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn no_ops() -> OperationalConfig {
        OperationalConfig {
            backup_enabled: false,
            backup_size_gb: 0.0,
            network_traffic_gb: 0.0,
            orchestration_cluster_count: 0,
            orchestration_cluster_monthly_cost: 0.0,
            orchestration_monitoring_monthly_cost: 0.0,
            one_time_migration_cost: 0.0,
            staff_fte: 0.0,
        }
    }

    fn no_storage() -> StorageConfig {
        StorageConfig {
            sql: TierStorage::new("gp3", 0.0),
            storage: TierStorage::new("gp3", 0.0),
            placement: TierStorage::new("gp3", 0.0),
            analytics: TierStorage::new("gp3", 0.0),
        }
    }

    #[test]
    fn test_compute_only_cluster() {
        let catalog = Catalog::builtin();
        let aggregation = aggregate(
            &TargetTopology::default(),
            &InstanceSelection::default(),
            &no_storage(),
            &no_ops(),
            0.0,
            &catalog,
        );
        let b = &aggregation.summary.breakdown;

        assert!(approx(b.get(labels::SQL_COMPUTE).unwrap(), 3.0 * 496.40));
        assert!(approx(b.get(labels::STORAGE_COMPUTE).unwrap(), 3.0 * 455.52));
        assert!(approx(b.get(labels::PLACEMENT_COMPUTE).unwrap(), 3.0 * 140.16));
        assert_eq!(b.get(labels::ANALYTICS_COMPUTE), Some(0.0));
        assert!(approx(b.get(labels::MONITORING_COMPUTE).unwrap(), 70.08));
        assert!(approx(
            aggregation.summary.total_monthly_cost,
            3.0 * (496.40 + 455.52 + 140.16) + 70.08
        ));
    }

    #[test]
    fn test_total_is_exact_sum_of_breakdown() {
        let catalog = Catalog::builtin();
        let topology = TargetTopology {
            sql_nodes: 5,
            storage_nodes: 9,
            analytics_nodes: 2,
            use_analytics_tier: true,
            ..TargetTopology::default()
        };
        let summary = aggregate(
            &topology,
            &InstanceSelection::default(),
            &StorageConfig::default(),
            &OperationalConfig::default(),
            20_000.0,
            &catalog,
        )
        .summary;

        let sum: f64 = summary.breakdown.iter().map(|l| l.monthly_value).sum();
        assert_eq!(summary.total_monthly_cost, sum);
        assert_eq!(summary.breakdown.len(), 12);
    }

    #[test]
    fn test_zero_size_tiers_cost_nothing_for_any_class() {
        let catalog = Catalog::builtin();
        let storage = StorageConfig {
            sql: TierStorage::new("io2", 0.0),
            storage: TierStorage::new("io1", 0.0),
            placement: TierStorage::new("gp2", 0.0),
            analytics: TierStorage::new("sc1", 0.0),
        };
        let b = aggregate(
            &TargetTopology::default(),
            &InstanceSelection::default(),
            &storage,
            &no_ops(),
            0.0,
            &catalog,
        )
        .summary
        .breakdown;

        for label in [
            labels::SQL_STORAGE,
            labels::STORAGE_STORAGE,
            labels::PLACEMENT_STORAGE,
            labels::ANALYTICS_STORAGE,
        ] {
            assert_eq!(b.get(label), Some(0.0), "{}", label);
        }
    }

    #[test]
    fn test_local_instance_store_covers_storage_volume() {
        let catalog = Catalog::builtin();
        let mut storage = no_storage();
        storage.storage = TierStorage::new("gp3", 2500.0).with_local_instance_store(true);

        let b = aggregate(
            &TargetTopology::default(),
            &InstanceSelection::default(),
            &storage,
            &no_ops(),
            0.0,
            &catalog,
        )
        .summary
        .breakdown;

        // 600 GB beyond the 1900 GB NVMe on each of 3 nodes
        assert!(approx(b.get(labels::STORAGE_STORAGE).unwrap(), 3.0 * 600.0 * 0.08));

        storage.storage.size_gb = 1500.0;
        let b = aggregate(
            &TargetTopology::default(),
            &InstanceSelection::default(),
            &storage,
            &no_ops(),
            0.0,
            &catalog,
        )
        .summary
        .breakdown;
        assert_eq!(b.get(labels::STORAGE_STORAGE), Some(0.0));
    }

    #[test]
    fn test_local_store_ignored_without_nvme_class() {
        let catalog = Catalog::builtin();
        let mut storage = no_storage();
        storage.storage = TierStorage::new("gp3", 1000.0).with_local_instance_store(true);
        let selection = InstanceSelection {
            storage: "m5.4xlarge".to_string(),
            ..InstanceSelection::default()
        };

        let b = aggregate(
            &TargetTopology::default(),
            &selection,
            &storage,
            &no_ops(),
            0.0,
            &catalog,
        )
        .summary
        .breakdown;
        assert!(approx(b.get(labels::STORAGE_STORAGE).unwrap(), 3.0 * 80.0));
    }

    #[test]
    fn test_operational_lines() {
        let catalog = Catalog::builtin();
        let operational = OperationalConfig {
            backup_enabled: true,
            backup_size_gb: 1000.0,
            network_traffic_gb: 5000.0,
            orchestration_cluster_count: 2,
            orchestration_cluster_monthly_cost: 73.0,
            orchestration_monitoring_monthly_cost: 200.0,
            ..no_ops()
        };
        let b = aggregate(
            &TargetTopology::default(),
            &InstanceSelection::default(),
            &no_storage(),
            &operational,
            0.0,
            &catalog,
        )
        .summary
        .breakdown;

        assert!(approx(b.get(labels::BACKUP).unwrap(), 23.0));
        assert!(approx(b.get(labels::NETWORK).unwrap(), 50.0));
        assert!(approx(b.get(labels::ORCHESTRATION).unwrap(), 346.0));

        let disabled = OperationalConfig {
            backup_enabled: false,
            ..operational
        };
        let b = aggregate(
            &TargetTopology::default(),
            &InstanceSelection::default(),
            &no_storage(),
            &disabled,
            0.0,
            &catalog,
        )
        .summary
        .breakdown;
        assert_eq!(b.get(labels::BACKUP), Some(0.0));
    }

    #[test]
    fn test_zero_source_cost_reports_zero_percent() {
        let summary = aggregate(
            &TargetTopology::default(),
            &InstanceSelection::default(),
            &StorageConfig::default(),
            &OperationalConfig::default(),
            0.0,
            &Catalog::builtin(),
        )
        .summary;

        assert_eq!(summary.savings_percent, 0.0);
        assert!(!summary.savings_percent.is_nan());
        assert!(summary.savings_amount < 0.0);
        assert_eq!(summary.payback, Payback::NotApplicable);
    }

    #[test]
    fn test_savings_and_payback() {
        assert!(approx(savings_percent(2500.0, 10_000.0), 25.0));
        assert_eq!(payback(50_000.0, 2500.0), Payback::Months(20.0));
        assert_eq!(payback(50_000.0, 0.0), Payback::NotApplicable);
        assert_eq!(payback(50_000.0, -10.0), Payback::NotApplicable);
        assert_eq!(payback(0.0, 100.0), Payback::Months(0.0));
    }

    #[test]
    fn test_unknown_classes_warn_but_price() {
        let selection = InstanceSelection {
            monitoring: "tiny.box".to_string(),
            ..InstanceSelection::default()
        };
        let aggregation = aggregate(
            &TargetTopology::default(),
            &selection,
            &no_storage(),
            &no_ops(),
            0.0,
            &Catalog::builtin(),
        );
        assert_eq!(aggregation.warnings.len(), 1);
        assert!(aggregation.summary.total_monthly_cost > 0.0);
    }
}
