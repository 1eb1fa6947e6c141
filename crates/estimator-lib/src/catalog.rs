//! Instance and storage pricing catalog
//!
//! The catalog is a read-only lookup table queried by exact key. A missing key
//! never fails: it resolves to a documented fallback and a [`CatalogWarning`]
//! is pushed into the caller's warning sink.
//!
//! Fallbacks:
//! - unknown instance class: [`FALLBACK_INSTANCE`] (16 compute units, 32 GB,
//!   priced like the default compute-optimized SQL class, no local storage)
//! - unknown storage class: the catalog's [`DEFAULT_STORAGE_CLASS`] entry, or
//!   [`FALLBACK_STORAGE`] if the catalog lacks that too

use crate::error::{EstimatorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default compute-optimized SQL tier class
pub const DEFAULT_SQL_INSTANCE_CLASS: &str = "c5.4xlarge";

/// SQL tier class for sources with at least 64 GB per instance
pub const MEDIUM_MEMORY_SQL_INSTANCE_CLASS: &str = "m5.4xlarge";

/// SQL tier class for sources with at least 128 GB per instance
pub const HIGH_MEMORY_SQL_INSTANCE_CLASS: &str = "r5.4xlarge";

pub const DEFAULT_STORAGE_INSTANCE_CLASS: &str = "i3.2xlarge";
pub const DEFAULT_PLACEMENT_INSTANCE_CLASS: &str = "m5.xlarge";
pub const DEFAULT_ANALYTICS_INSTANCE_CLASS: &str = "r5.2xlarge";
pub const DEFAULT_MONITORING_INSTANCE_CLASS: &str = "m5.large";

/// Storage class used when a requested class is unknown
pub const DEFAULT_STORAGE_CLASS: &str = "gp3";

/// Compute units assumed for an unknown instance class
pub const FALLBACK_COMPUTE_UNITS: u32 = 16;

pub const FALLBACK_INSTANCE: InstanceSpec = InstanceSpec {
    compute_units: FALLBACK_COMPUTE_UNITS,
    memory_gb: 32.0,
    monthly_cost: 496.40,
    local_storage_gb: None,
};

pub const FALLBACK_STORAGE: StoragePricing = StoragePricing {
    rule: StoragePricingRule::IopsTunable,
    price_per_gb: 0.08,
    iops_price: Some(0.005),
    throughput_price: Some(0.04),
};

/// Hardware shape and price of one instance class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// vCPUs
    pub compute_units: u32,
    pub memory_gb: f64,
    /// On-demand price for a month of uptime
    pub monthly_cost: f64,
    /// Attached NVMe instance store, if the class has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_storage_gb: Option<f64>,
}

/// How a block storage class charges beyond its per-GB price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoragePricingRule {
    /// Capacity only
    #[default]
    Flat,
    /// Baseline of 3000 IOPS and 125 MB/s included, excess charged
    IopsTunable,
    /// Every provisioned IOPS is charged
    ProvisionedIops,
}

/// Pricing for one block storage class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoragePricing {
    #[serde(default)]
    pub rule: StoragePricingRule,
    pub price_per_gb: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iops_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput_price: Option<f64>,
}

/// A catalog miss that was resolved by a fallback
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogWarning {
    UnknownInstanceClass { key: String },
    UnknownStorageClass { key: String, fallback: String },
}

impl std::fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogWarning::UnknownInstanceClass { key } => write!(
                f,
                "unknown instance class '{}', assuming {} vCPU",
                key, FALLBACK_COMPUTE_UNITS
            ),
            CatalogWarning::UnknownStorageClass { key, fallback } => {
                write!(f, "unknown storage class '{}', priced as '{}'", key, fallback)
            }
        }
    }
}

/// Immutable pricing catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Version label of the pricing data
    pub version: String,
    pub instances: BTreeMap<String, InstanceSpec>,
    pub storage_classes: BTreeMap<String, StoragePricing>,
}

impl Catalog {
    /// Built-in on-demand pricing table (us-east-1, 730 hours per month)
    pub fn builtin() -> Self {
        let instances = [
            // Target cluster classes
            ("c5.2xlarge", 8, 16.0, 248.20, None),
            ("c5.4xlarge", 16, 32.0, 496.40, None),
            ("c5.9xlarge", 36, 72.0, 1116.90, None),
            ("m5.large", 2, 8.0, 70.08, None),
            ("m5.xlarge", 4, 16.0, 140.16, None),
            ("m5.2xlarge", 8, 32.0, 280.32, None),
            ("m5.4xlarge", 16, 64.0, 560.64, None),
            ("r5.2xlarge", 8, 64.0, 367.92, None),
            ("r5.4xlarge", 16, 128.0, 735.84, None),
            ("i3.2xlarge", 8, 61.0, 455.52, Some(1900.0)),
            ("i3.4xlarge", 16, 122.0, 911.04, Some(3800.0)),
            // Source database classes
            ("db.m5.large", 2, 8.0, 124.83, None),
            ("db.m5.xlarge", 4, 16.0, 249.66, None),
            ("db.m5.2xlarge", 8, 32.0, 499.32, None),
            ("db.m5.4xlarge", 16, 64.0, 998.64, None),
            ("db.r5.large", 2, 16.0, 182.50, None),
            ("db.r5.xlarge", 4, 32.0, 365.00, None),
            ("db.r5.2xlarge", 8, 64.0, 730.00, None),
            ("db.r5.4xlarge", 16, 128.0, 1460.00, None),
            ("db.r5.8xlarge", 32, 256.0, 2920.00, None),
            ("db.r5.12xlarge", 48, 384.0, 4380.00, None),
        ]
        .into_iter()
        .map(|(key, compute_units, memory_gb, monthly_cost, local_storage_gb)| {
            (
                key.to_string(),
                InstanceSpec {
                    compute_units,
                    memory_gb,
                    monthly_cost,
                    local_storage_gb,
                },
            )
        })
        .collect();

        let storage_classes = [
            ("gp3", FALLBACK_STORAGE),
            (
                "gp2",
                StoragePricing {
                    rule: StoragePricingRule::Flat,
                    price_per_gb: 0.10,
                    iops_price: None,
                    throughput_price: None,
                },
            ),
            (
                "io1",
                StoragePricing {
                    rule: StoragePricingRule::ProvisionedIops,
                    price_per_gb: 0.125,
                    iops_price: Some(0.065),
                    throughput_price: None,
                },
            ),
            (
                "io2",
                StoragePricing {
                    rule: StoragePricingRule::ProvisionedIops,
                    price_per_gb: 0.125,
                    iops_price: Some(0.065),
                    throughput_price: None,
                },
            ),
            (
                "st1",
                StoragePricing {
                    rule: StoragePricingRule::Flat,
                    price_per_gb: 0.045,
                    iops_price: None,
                    throughput_price: None,
                },
            ),
            (
                "sc1",
                StoragePricing {
                    rule: StoragePricingRule::Flat,
                    price_per_gb: 0.015,
                    iops_price: None,
                    throughput_price: None,
                },
            ),
        ]
        .into_iter()
        .map(|(key, pricing)| (key.to_string(), pricing))
        .collect();

        Self {
            version: "builtin-2024.1".to_string(),
            instances,
            storage_classes,
        }
    }

    /// Parse a catalog from JSON and check it is usable
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.check()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    fn check(&self) -> Result<()> {
        if self.instances.is_empty() {
            return Err(EstimatorError::CatalogLoad(
                "catalog has no instance classes".to_string(),
            ));
        }
        for (key, spec) in &self.instances {
            if spec.monthly_cost < 0.0 || spec.memory_gb < 0.0 {
                return Err(EstimatorError::CatalogLoad(format!(
                    "instance class '{}' has a negative price or memory size",
                    key
                )));
            }
        }
        for (key, pricing) in &self.storage_classes {
            let negative = pricing.price_per_gb < 0.0
                || pricing.iops_price.is_some_and(|p| p < 0.0)
                || pricing.throughput_price.is_some_and(|p| p < 0.0);
            if negative {
                return Err(EstimatorError::CatalogLoad(format!(
                    "storage class '{}' has a negative price",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Exact-match instance lookup
    pub fn instance(&self, key: &str) -> Option<&InstanceSpec> {
        self.instances.get(key)
    }

    /// Instance lookup that falls back to [`FALLBACK_INSTANCE`]
    pub fn resolve_instance(&self, key: &str, warnings: &mut Vec<CatalogWarning>) -> InstanceSpec {
        match self.instances.get(key) {
            Some(spec) => *spec,
            None => {
                warnings.push(CatalogWarning::UnknownInstanceClass {
                    key: key.to_string(),
                });
                FALLBACK_INSTANCE
            }
        }
    }

    /// Exact-match storage class lookup
    pub fn storage_class(&self, key: &str) -> Option<&StoragePricing> {
        self.storage_classes.get(key)
    }

    /// Storage lookup that falls back to the default class
    pub fn resolve_storage(&self, key: &str, warnings: &mut Vec<CatalogWarning>) -> StoragePricing {
        if let Some(pricing) = self.storage_classes.get(key) {
            return *pricing;
        }
        warnings.push(CatalogWarning::UnknownStorageClass {
            key: key.to_string(),
            fallback: DEFAULT_STORAGE_CLASS.to_string(),
        });
        self.storage_classes
            .get(DEFAULT_STORAGE_CLASS)
            .copied()
            .unwrap_or(FALLBACK_STORAGE)
    }

    /// Default classes the engine relies on that this catalog does not carry
    pub fn missing_defaults(&self) -> Vec<String> {
        let mut missing: Vec<String> = [
            DEFAULT_SQL_INSTANCE_CLASS,
            MEDIUM_MEMORY_SQL_INSTANCE_CLASS,
            HIGH_MEMORY_SQL_INSTANCE_CLASS,
            DEFAULT_STORAGE_INSTANCE_CLASS,
            DEFAULT_PLACEMENT_INSTANCE_CLASS,
            DEFAULT_ANALYTICS_INSTANCE_CLASS,
            DEFAULT_MONITORING_INSTANCE_CLASS,
        ]
        .into_iter()
        .filter(|key| !self.instances.contains_key(*key))
        .map(str::to_string)
        .collect();

        if !self.storage_classes.contains_key(DEFAULT_STORAGE_CLASS) {
            missing.push(DEFAULT_STORAGE_CLASS.to_string());
        }
        missing
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
