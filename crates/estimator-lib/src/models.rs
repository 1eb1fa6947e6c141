//! Core data models for the migration estimator

use crate::catalog::{
    Catalog, CatalogWarning, DEFAULT_ANALYTICS_INSTANCE_CLASS, DEFAULT_MONITORING_INSTANCE_CLASS,
    DEFAULT_PLACEMENT_INSTANCE_CLASS, DEFAULT_SQL_INSTANCE_CLASS, DEFAULT_STORAGE_CLASS,
    DEFAULT_STORAGE_INSTANCE_CLASS,
};
use crate::storage_cost::{storage_cost_for_class, BASELINE_IOPS, BASELINE_THROUGHPUT_MBS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The relational deployment being migrated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Catalog key of the source instance class
    pub instance_class: String,
    pub instance_count: u32,
    pub storage_gb: f64,
    pub provisioned_iops: f64,
    pub read_ops_per_sec: f64,
    pub write_ops_per_sec: f64,
    /// What the source deployment costs today
    pub monthly_cost: f64,
    pub multi_az: bool,
    pub read_replica_count: u32,
}

impl Default for SourceProfile {
    fn default() -> Self {
        Self {
            instance_class: "db.r5.xlarge".to_string(),
            instance_count: 1,
            storage_gb: 500.0,
            provisioned_iops: BASELINE_IOPS,
            read_ops_per_sec: 2000.0,
            write_ops_per_sec: 500.0,
            monthly_cost: 1000.0,
            multi_az: false,
            read_replica_count: 0,
        }
    }
}

impl SourceProfile {
    /// Price the source deployment from the catalog
    ///
    /// Primaries are doubled for Multi-AZ standbys, replicas are priced as
    /// single instances, and every copy carries its own default-class volume.
    pub fn estimate_monthly_cost(&self, catalog: &Catalog, warnings: &mut Vec<CatalogWarning>) -> f64 {
        let spec = catalog.resolve_instance(&self.instance_class, warnings);
        let az_factor = if self.multi_az { 2.0 } else { 1.0 };
        let copies = f64::from(self.instance_count) * az_factor + f64::from(self.read_replica_count);

        let volume = storage_cost_for_class(
            catalog,
            DEFAULT_STORAGE_CLASS,
            self.storage_gb,
            self.provisioned_iops,
            BASELINE_THROUGHPUT_MBS,
            warnings,
        );

        copies * (spec.monthly_cost + volume)
    }
}

/// Share of reads versus writes in the workload
///
/// Parsing is an exact match over the four supported ratios. Anything else is
/// kept verbatim as [`ReadWriteRatio::Other`] and treated as read-heavy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReadWriteRatio {
    R90W10,
    #[default]
    R80W20,
    R50W50,
    R30W70,
    Other(String),
}

impl ReadWriteRatio {
    pub fn as_str(&self) -> &str {
        match self {
            ReadWriteRatio::R90W10 => "90/10",
            ReadWriteRatio::R80W20 => "80/20",
            ReadWriteRatio::R50W50 => "50/50",
            ReadWriteRatio::R30W70 => "30/70",
            ReadWriteRatio::Other(s) => s,
        }
    }

    /// Storage tier multiplier for write-heavy mixes
    pub fn write_heavy_multiplier(&self) -> f64 {
        match self {
            ReadWriteRatio::R50W50 => 1.5,
            ReadWriteRatio::R30W70 => 2.0,
            _ => 1.0,
        }
    }
}

impl FromStr for ReadWriteRatio {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "90/10" => ReadWriteRatio::R90W10,
            "80/20" => ReadWriteRatio::R80W20,
            "50/50" => ReadWriteRatio::R50W50,
            "30/70" => ReadWriteRatio::R30W70,
            other => ReadWriteRatio::Other(other.to_string()),
        })
    }
}

impl From<String> for ReadWriteRatio {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(ratio) => ratio,
            Err(never) => match never {},
        }
    }
}

impl From<ReadWriteRatio> for String {
    fn from(ratio: ReadWriteRatio) -> Self {
        ratio.as_str().to_string()
    }
}

impl fmt::Display for ReadWriteRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkloadType {
    #[default]
    #[serde(rename = "OLTP", alias = "oltp")]
    Oltp,
    #[serde(rename = "OLAP", alias = "olap")]
    Olap,
    #[serde(rename = "Mixed", alias = "mixed")]
    Mixed,
}

impl WorkloadType {
    /// OLAP and mixed workloads get a columnar analytics tier
    pub fn needs_analytics_tier(&self) -> bool {
        matches!(self, WorkloadType::Olap | WorkloadType::Mixed)
    }
}

impl fmt::Display for WorkloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadType::Oltp => f.write_str("OLTP"),
            WorkloadType::Olap => f.write_str("OLAP"),
            WorkloadType::Mixed => f.write_str("Mixed"),
        }
    }
}

/// Traffic characteristics of the workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadProfile {
    pub read_write_ratio: ReadWriteRatio,
    pub workload_type: WorkloadType,
    pub concurrent_connections: u32,
    pub traffic_spikes: bool,
    pub peak_to_normal_ratio: f64,
}

impl Default for WorkloadProfile {
    fn default() -> Self {
        Self {
            read_write_ratio: ReadWriteRatio::R80W20,
            workload_type: WorkloadType::Oltp,
            concurrent_connections: 200,
            traffic_spikes: false,
            peak_to_normal_ratio: 2.0,
        }
    }
}

/// Node counts of the target cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTopology {
    pub sql_nodes: u32,
    pub storage_nodes: u32,
    pub placement_nodes: u32,
    pub analytics_nodes: u32,
    pub use_analytics_tier: bool,
    pub worker_node_count: u32,
    /// Copies of each shard, kept within [3, 5]
    pub replication_factor: u32,
}

impl Default for TargetTopology {
    fn default() -> Self {
        Self {
            sql_nodes: 3,
            storage_nodes: 3,
            placement_nodes: 3,
            analytics_nodes: 0,
            use_analytics_tier: false,
            worker_node_count: 6,
            replication_factor: 3,
        }
    }
}

/// Instance class chosen for each tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSelection {
    pub sql: String,
    pub storage: String,
    pub placement: String,
    pub analytics: String,
    pub monitoring: String,
}

impl Default for InstanceSelection {
    fn default() -> Self {
        Self {
            sql: DEFAULT_SQL_INSTANCE_CLASS.to_string(),
            storage: DEFAULT_STORAGE_INSTANCE_CLASS.to_string(),
            placement: DEFAULT_PLACEMENT_INSTANCE_CLASS.to_string(),
            analytics: DEFAULT_ANALYTICS_INSTANCE_CLASS.to_string(),
            monitoring: DEFAULT_MONITORING_INSTANCE_CLASS.to_string(),
        }
    }
}

fn default_iops() -> f64 {
    BASELINE_IOPS
}

fn default_throughput() -> f64 {
    BASELINE_THROUGHPUT_MBS
}

/// Block volume attached to every node of a tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStorage {
    pub storage_class: String,
    pub size_gb: f64,
    #[serde(default = "default_iops")]
    pub provisioned_iops: f64,
    #[serde(default = "default_throughput")]
    pub provisioned_throughput_mbs: f64,
    /// Only honoured on the storage tier
    #[serde(default)]
    pub use_local_instance_store: bool,
}

impl TierStorage {
    pub fn new(storage_class: impl Into<String>, size_gb: f64) -> Self {
        Self {
            storage_class: storage_class.into(),
            size_gb,
            provisioned_iops: BASELINE_IOPS,
            provisioned_throughput_mbs: BASELINE_THROUGHPUT_MBS,
            use_local_instance_store: false,
        }
    }

    pub fn with_local_instance_store(mut self, enabled: bool) -> Self {
        self.use_local_instance_store = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub sql: TierStorage,
    pub storage: TierStorage,
    pub placement: TierStorage,
    pub analytics: TierStorage,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sql: TierStorage::new(DEFAULT_STORAGE_CLASS, 100.0),
            storage: TierStorage::new(DEFAULT_STORAGE_CLASS, 1000.0).with_local_instance_store(true),
            placement: TierStorage::new(DEFAULT_STORAGE_CLASS, 50.0),
            analytics: TierStorage::new(DEFAULT_STORAGE_CLASS, 500.0),
        }
    }
}

/// Running costs outside the cluster nodes themselves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalConfig {
    pub backup_enabled: bool,
    pub backup_size_gb: f64,
    /// Monthly network egress
    pub network_traffic_gb: f64,
    pub orchestration_cluster_count: u32,
    pub orchestration_cluster_monthly_cost: f64,
    pub orchestration_monitoring_monthly_cost: f64,
    pub one_time_migration_cost: f64,
    /// Reported only; staff time is not priced
    pub staff_fte: f64,
}

impl Default for OperationalConfig {
    fn default() -> Self {
        Self {
            backup_enabled: true,
            backup_size_gb: 500.0,
            network_traffic_gb: 1000.0,
            orchestration_cluster_count: 1,
            orchestration_cluster_monthly_cost: 73.0,
            orchestration_monitoring_monthly_cost: 150.0,
            one_time_migration_cost: 50_000.0,
            staff_fte: 0.5,
        }
    }
}

/// One labelled line of the monthly bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub label: String,
    pub monthly_value: f64,
}

/// Ordered monthly bill, rebuilt on every recomputation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostBreakdown(Vec<CostLine>);

impl CostBreakdown {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, label: impl Into<String>, monthly_value: f64) {
        self.0.push(CostLine {
            label: label.into(),
            monthly_value,
        });
    }

    /// Sum of all lines
    pub fn total(&self) -> f64 {
        self.0.iter().map(|line| line.monthly_value).sum()
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|line| line.label == label)
            .map(|line| line.monthly_value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CostLine> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Months until savings cover the one-time migration cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payback {
    Months(f64),
    /// The migration never pays for itself (no positive savings)
    NotApplicable,
}

impl Payback {
    pub fn months(&self) -> Option<f64> {
        match self {
            Payback::Months(m) => Some(*m),
            Payback::NotApplicable => None,
        }
    }
}

impl fmt::Display for Payback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payback::Months(m) => write!(f, "{:.1} months", m),
            Payback::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Priced target cluster compared against the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub breakdown: CostBreakdown,
    pub total_monthly_cost: f64,
    pub source_monthly_cost: f64,
    pub savings_amount: f64,
    pub savings_percent: f64,
    pub payback: Payback,
}
