//! End-to-end scenarios across catalog, engine and session

use crate::catalog::{Catalog, CatalogWarning};
use crate::cost::labels;
use crate::engine::Scenario;
use crate::models::{ReadWriteRatio, SourceProfile, WorkloadProfile, WorkloadType};
use crate::observability::StructuredLogger;
use crate::session::EstimatorSession;
use std::sync::Arc;

const SPARSE_CATALOG: &str = r#"{
    "version": "sparse-test",
    "instances": {
        "db.r5.xlarge": { "compute_units": 4, "memory_gb": 32.0, "monthly_cost": 365.0 }
    },
    "storage_classes": {
        "gp3": {
            "rule": "iops_tunable",
            "price_per_gb": 0.08,
            "iops_price": 0.005,
            "throughput_price": 0.04
        }
    }
}"#;

fn reference_scenario() -> Scenario {
    Scenario {
        source: SourceProfile {
            instance_class: "db.m5.2xlarge".to_string(),
            instance_count: 2,
            storage_gb: 1000.0,
            provisioned_iops: 3000.0,
            read_ops_per_sec: 4000.0,
            write_ops_per_sec: 1000.0,
            monthly_cost: 2500.0,
            multi_az: false,
            read_replica_count: 1,
        },
        workload: WorkloadProfile {
            read_write_ratio: ReadWriteRatio::R80W20,
            workload_type: WorkloadType::Oltp,
            concurrent_connections: 200,
            traffic_spikes: true,
            peak_to_normal_ratio: 3.0,
        },
        ..Scenario::default()
    }
}

#[test]
fn test_sparse_catalog_file_prices_with_fallbacks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, SPARSE_CATALOG).unwrap();

    let catalog = Catalog::from_json_file(&path).unwrap();
    assert!(catalog
        .missing_defaults()
        .contains(&"c5.4xlarge".to_string()));

    let mut session = EstimatorSession::new(Arc::new(catalog), StructuredLogger::new("test"));
    let response = session.recompute().unwrap();

    // Unknown SQL class priced like c5.4xlarge, 3 nodes
    let sql_compute = response.breakdown.get(labels::SQL_COMPUTE).unwrap();
    assert!((sql_compute - 3.0 * 496.40).abs() < 1e-6);
    assert!(response.warnings.contains(&CatalogWarning::UnknownInstanceClass {
        key: "c5.4xlarge".to_string()
    }));
    assert_eq!(response.warnings.len(), 4);
}

#[test]
fn test_reference_walkthrough() {
    let mut session =
        EstimatorSession::new(Arc::new(Catalog::builtin()), StructuredLogger::new("test"));

    let first = session.update_scenario(reference_scenario()).unwrap();
    assert_eq!(first.target.sql_nodes, 5);
    assert_eq!(first.target.storage_nodes, 3);
    assert_eq!(first.target.worker_node_count, 8);
    assert!(first.history.is_empty());

    let source = SourceProfile {
        instance_class: "db.r5.4xlarge".to_string(),
        ..reference_scenario().source
    };
    let second = session.update_source(source).unwrap();
    assert_eq!(second.selection.sql, "r5.4xlarge");

    let entry = second.history.latest().unwrap();
    assert_eq!(entry.sequence_id, 1);
    assert_eq!(entry.vcpu_delta, "8 → 16 (+8)");
    assert_eq!(entry.memory_delta, "32GB → 128GB (+96GB)");
    assert_eq!(entry.sql_nodes_delta, "3 → 5 (+2)");
    assert_eq!(entry.instance_class_delta, "c5.4xlarge → r5.4xlarge");
    assert_eq!(entry.resulting_monthly_cost, second.total_monthly_cost);
}
