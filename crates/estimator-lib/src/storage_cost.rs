//! Block storage pricing

use crate::catalog::{Catalog, CatalogWarning, StoragePricing, StoragePricingRule};

/// IOPS included with an IOPS-tunable volume
pub const BASELINE_IOPS: f64 = 3000.0;

/// Throughput (MB/s) included with an IOPS-tunable volume
pub const BASELINE_THROUGHPUT_MBS: f64 = 125.0;

/// Monthly cost of one volume under the given pricing rule
///
/// A zero-size volume does not exist and costs nothing regardless of class.
pub fn storage_monthly_cost(
    pricing: &StoragePricing,
    size_gb: f64,
    provisioned_iops: f64,
    provisioned_throughput_mbs: f64,
) -> f64 {
    if size_gb <= 0.0 {
        return 0.0;
    }

    let mut cost = size_gb * pricing.price_per_gb;

    match pricing.rule {
        StoragePricingRule::Flat => {}
        StoragePricingRule::IopsTunable => {
            if provisioned_iops > BASELINE_IOPS {
                cost += (provisioned_iops - BASELINE_IOPS) * pricing.iops_price.unwrap_or(0.0);
            }
            if provisioned_throughput_mbs > BASELINE_THROUGHPUT_MBS {
                cost += (provisioned_throughput_mbs - BASELINE_THROUGHPUT_MBS)
                    * pricing.throughput_price.unwrap_or(0.0);
            }
        }
        StoragePricingRule::ProvisionedIops => {
            cost += provisioned_iops * pricing.iops_price.unwrap_or(0.0);
        }
    }

    cost
}

/// Price a volume by storage class key, falling back to the default class
pub fn storage_cost_for_class(
    catalog: &Catalog,
    storage_class: &str,
    size_gb: f64,
    provisioned_iops: f64,
    provisioned_throughput_mbs: f64,
    warnings: &mut Vec<CatalogWarning>,
) -> f64 {
    if size_gb <= 0.0 {
        return 0.0;
    }
    let pricing = catalog.resolve_storage(storage_class, warnings);
    storage_monthly_cost(&pricing, size_gb, provisioned_iops, provisioned_throughput_mbs)
}
