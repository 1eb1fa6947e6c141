//! Target topology derivation
//!
//! Converts a source deployment and its workload into node counts and
//! instance classes for each tier of the target cluster. Everything here is a
//! pure function of its arguments; catalog misses resolve to fallbacks and
//! are reported through [`Derivation::warnings`].
//!
//! Sizing rules, in order:
//! 1. effective compute load of the source, replicas included
//! 2. SQL nodes from compute load and from connection count (minimum 3 each)
//! 3. storage nodes from compressed, replicated capacity and from write
//!    throughput, in multiples of 3 for even spread over 3 zones
//! 4. write-heavy multiplier on storage, spike multiplier on SQL
//! 5. analytics nodes for OLAP and mixed workloads (minimum 2)
//! 6. Kubernetes worker estimate from the total component count
//! 7. SQL instance class from source memory per instance

use crate::catalog::{
    Catalog, CatalogWarning, DEFAULT_SQL_INSTANCE_CLASS, FALLBACK_COMPUTE_UNITS,
    HIGH_MEMORY_SQL_INSTANCE_CLASS, MEDIUM_MEMORY_SQL_INSTANCE_CLASS,
};
use crate::error::{EstimatorError, Result};
use crate::models::{InstanceSelection, SourceProfile, TargetTopology, WorkloadProfile};
use tracing::debug;

/// Quorum minimum for SQL, storage and placement tiers
pub const MIN_TIER_NODES: u32 = 3;

/// Minimum analytics replicas when the tier is active
pub const MIN_ANALYTICS_NODES: u32 = 2;

pub const MIN_REPLICATION_FACTOR: u32 = 3;
pub const MAX_REPLICATION_FACTOR: u32 = 5;

/// Client connections one SQL node serves
pub const CONNECTIONS_PER_SQL_NODE: f64 = 500.0;

/// On-disk size relative to the source after compression
pub const COMPRESSION_RATIO: f64 = 0.4;

/// Fill level a storage node is planned to
pub const USAGE_HEADROOM: f64 = 0.8;

pub const MAX_GB_PER_STORAGE_NODE: f64 = 4000.0;

/// Write operations per second one storage node absorbs
pub const WRITES_PER_STORAGE_NODE: f64 = 5000.0;

/// Storage nodes are placed evenly across this many zones
pub const AVAILABILITY_ZONES: u32 = 3;

pub const ANALYTICS_REPLICAS: f64 = 2.0;

pub const MAX_SPIKE_MULTIPLIER: f64 = 2.0;

/// Cluster components packed onto one worker node
pub const COMPONENTS_PER_WORKER: f64 = 1.5;

pub const MIN_WORKER_NODES: u32 = 6;

/// Source memory per instance that selects the high-memory SQL class
pub const HIGH_MEMORY_THRESHOLD_GB: f64 = 128.0;

/// Source memory per instance that selects the medium-memory SQL class
pub const MEDIUM_MEMORY_THRESHOLD_GB: f64 = 64.0;

/// Whether traffic multipliers take part in sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingMode {
    /// Write-heavy and spike multipliers applied
    Full,
    /// Fixed-minimum sizing with no traffic multipliers
    Baseline,
}

/// Output of a derivation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub topology: TargetTopology,
    pub selection: InstanceSelection,
    pub warnings: Vec<CatalogWarning>,
}

fn ceil_u32(value: f64) -> u32 {
    // `as` saturates, negative and NaN become 0
    value.ceil() as u32
}

/// Aggregate compute units the source serves, replicas included
pub fn effective_compute_load(source_units: u32, instance_count: u32, read_replica_count: u32) -> f64 {
    let count = f64::from(instance_count);
    f64::from(source_units) * count * (1.0 + f64::from(read_replica_count) / count)
}

pub fn sql_nodes_for_compute(effective_load: f64, units_per_sql_node: u32) -> u32 {
    let units = if units_per_sql_node == 0 {
        FALLBACK_COMPUTE_UNITS
    } else {
        units_per_sql_node
    };
    MIN_TIER_NODES.max(ceil_u32(effective_load / f64::from(units)))
}

pub fn sql_nodes_for_connections(concurrent_connections: u32) -> u32 {
    MIN_TIER_NODES.max(ceil_u32(f64::from(concurrent_connections) / CONNECTIONS_PER_SQL_NODE))
}

/// Storage nodes needed to hold the data, a multiple of the zone count
///
/// Zero storage contributes zero nodes.
pub fn storage_nodes_for_capacity(storage_gb: f64, replication_factor: u32) -> u32 {
    let zones = f64::from(AVAILABILITY_ZONES);
    let per_zone = storage_gb * COMPRESSION_RATIO * f64::from(replication_factor)
        / (USAGE_HEADROOM * MAX_GB_PER_STORAGE_NODE * zones);
    ceil_u32(per_zone).saturating_mul(AVAILABILITY_ZONES)
}

/// Storage nodes needed to absorb the write rate, a multiple of the zone count
pub fn storage_nodes_for_writes(write_ops_per_sec: f64) -> u32 {
    let per_zone = write_ops_per_sec / WRITES_PER_STORAGE_NODE / f64::from(AVAILABILITY_ZONES);
    MIN_TIER_NODES.max(ceil_u32(per_zone).saturating_mul(AVAILABILITY_ZONES))
}

pub fn analytics_nodes_for_capacity(storage_gb: f64, replication_factor: u32) -> u32 {
    let nodes = storage_gb * COMPRESSION_RATIO * ANALYTICS_REPLICAS
        / (f64::from(replication_factor) * USAGE_HEADROOM * MAX_GB_PER_STORAGE_NODE);
    MIN_ANALYTICS_NODES.max(ceil_u32(nodes))
}

/// SQL tier multiplier for bursty traffic
pub fn spike_multiplier(workload: &WorkloadProfile) -> f64 {
    if workload.traffic_spikes {
        MAX_SPIKE_MULTIPLIER.min(workload.peak_to_normal_ratio / 2.0)
    } else {
        1.0
    }
}

/// Kubernetes worker nodes hosting every component plus one monitoring pod
pub fn worker_nodes_for(topology: &TargetTopology) -> u32 {
    let components = f64::from(topology.sql_nodes)
        + f64::from(topology.storage_nodes)
        + f64::from(topology.placement_nodes)
        + f64::from(topology.analytics_nodes)
        + 1.0;
    MIN_WORKER_NODES.max(ceil_u32(components / COMPONENTS_PER_WORKER))
}

/// SQL tier class matching the memory of one source instance
pub fn sql_instance_class_for_memory(memory_gb: f64) -> &'static str {
    if memory_gb >= HIGH_MEMORY_THRESHOLD_GB {
        HIGH_MEMORY_SQL_INSTANCE_CLASS
    } else if memory_gb >= MEDIUM_MEMORY_THRESHOLD_GB {
        MEDIUM_MEMORY_SQL_INSTANCE_CLASS
    } else {
        DEFAULT_SQL_INSTANCE_CLASS
    }
}

/// Derive the recommended topology and SQL instance class
pub fn derive(
    source: &SourceProfile,
    workload: &WorkloadProfile,
    current_target: &TargetTopology,
    current_selection: &InstanceSelection,
    catalog: &Catalog,
) -> Result<Derivation> {
    derive_with_mode(
        source,
        workload,
        current_target,
        current_selection,
        catalog,
        SizingMode::Full,
    )
}

pub fn derive_with_mode(
    source: &SourceProfile,
    workload: &WorkloadProfile,
    current_target: &TargetTopology,
    current_selection: &InstanceSelection,
    catalog: &Catalog,
    mode: SizingMode,
) -> Result<Derivation> {
    if source.instance_count == 0 {
        return Err(EstimatorError::invalid(
            "source.instance_count",
            "must be at least 1",
        ));
    }

    let mut warnings = Vec::new();
    let replication_factor = current_target
        .replication_factor
        .clamp(MIN_REPLICATION_FACTOR, MAX_REPLICATION_FACTOR);

    let source_spec = catalog.resolve_instance(&source.instance_class, &mut warnings);
    let sql_spec = catalog.resolve_instance(&current_selection.sql, &mut warnings);

    // SQL tier
    let load = effective_compute_load(
        source_spec.compute_units,
        source.instance_count,
        source.read_replica_count,
    );
    let by_compute = sql_nodes_for_compute(load, sql_spec.compute_units);
    let by_connections = sql_nodes_for_connections(workload.concurrent_connections);
    let base_sql = by_compute.max(by_connections);

    // Storage tier
    let by_capacity = storage_nodes_for_capacity(source.storage_gb, replication_factor);
    let by_writes = storage_nodes_for_writes(source.write_ops_per_sec);
    let base_storage = MIN_TIER_NODES.max(by_capacity.max(by_writes));

    let (sql_nodes, storage_nodes) = match mode {
        SizingMode::Full => {
            let write_heavy = workload.read_write_ratio.write_heavy_multiplier();
            let spike = spike_multiplier(workload);
            (
                MIN_TIER_NODES.max(ceil_u32(f64::from(base_sql) * spike)),
                MIN_TIER_NODES.max(ceil_u32(f64::from(base_storage) * write_heavy)),
            )
        }
        SizingMode::Baseline => (base_sql, base_storage),
    };

    let use_analytics_tier = workload.workload_type.needs_analytics_tier();
    let analytics_nodes = if use_analytics_tier {
        analytics_nodes_for_capacity(source.storage_gb, replication_factor)
    } else {
        0
    };

    let mut topology = TargetTopology {
        sql_nodes,
        storage_nodes,
        placement_nodes: MIN_TIER_NODES.max(current_target.placement_nodes),
        analytics_nodes,
        use_analytics_tier,
        worker_node_count: 0,
        replication_factor,
    };
    topology.worker_node_count = worker_nodes_for(&topology);

    let selection = InstanceSelection {
        sql: sql_instance_class_for_memory(source_spec.memory_gb).to_string(),
        ..current_selection.clone()
    };

    debug!(
        source_class = %source.instance_class,
        effective_load = load,
        sql_by_compute = by_compute,
        sql_by_connections = by_connections,
        storage_by_capacity = by_capacity,
        storage_by_writes = by_writes,
        sql_nodes = topology.sql_nodes,
        storage_nodes = topology.storage_nodes,
        analytics_nodes = topology.analytics_nodes,
        worker_nodes = topology.worker_node_count,
        sql_class = %selection.sql,
        "Derived target topology"
    );

    Ok(Derivation {
        topology,
        selection,
        warnings,
    })
}
