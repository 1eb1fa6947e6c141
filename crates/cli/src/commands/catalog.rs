//! Catalog listing command

use anyhow::Result;
use estimator_lib::{Catalog, StoragePricingRule};
use tabled::Tabled;

use super::Backend;
use crate::output::{format_currency, print_heading, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "vCPU")]
    vcpu: u32,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Local NVMe")]
    local_storage: String,
    #[tabled(rename = "Monthly")]
    monthly: String,
}

#[derive(Tabled)]
struct StorageRow {
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Pricing")]
    rule: &'static str,
    #[tabled(rename = "$/GB-month")]
    per_gb: String,
    #[tabled(rename = "$/IOPS")]
    iops: String,
    #[tabled(rename = "$/MBps")]
    throughput: String,
}

fn rule_name(rule: StoragePricingRule) -> &'static str {
    match rule {
        StoragePricingRule::Flat => "capacity only",
        StoragePricingRule::IopsTunable => "baseline + excess",
        StoragePricingRule::ProvisionedIops => "all provisioned IOPS",
    }
}

fn optional_price(price: Option<f64>) -> String {
    price.map_or_else(|| "-".to_string(), |p| format!("{:.3}", p))
}

/// List the instance and storage classes of the active catalog
pub async fn show_catalog(backend: &Backend, format: OutputFormat) -> Result<()> {
    let catalog: Catalog = match backend {
        Backend::Remote(client) => client.get("api/v1/catalog").await?,
        Backend::Local { catalog } => catalog.as_ref().clone(),
    };

    if let OutputFormat::Json = format {
        return print_json(&catalog);
    }

    print_heading(&format!("Pricing Catalog ({})", catalog.version), '=');

    let instances: Vec<InstanceRow> = catalog
        .instances
        .iter()
        .map(|(class, spec)| InstanceRow {
            class: class.clone(),
            vcpu: spec.compute_units,
            memory: format!("{:.0} GB", spec.memory_gb),
            local_storage: spec
                .local_storage_gb
                .map_or_else(|| "-".to_string(), |gb| format!("{:.0} GB", gb)),
            monthly: format_currency(spec.monthly_cost),
        })
        .collect();
    print_table(instances, "No instance classes");
    println!();

    let storage: Vec<StorageRow> = catalog
        .storage_classes
        .iter()
        .map(|(class, pricing)| StorageRow {
            class: class.clone(),
            rule: rule_name(pricing.rule),
            per_gb: format!("{:.3}", pricing.price_per_gb),
            iops: optional_price(pricing.iops_price),
            throughput: optional_price(pricing.throughput_price),
        })
        .collect();
    print_table(storage, "No storage classes");

    Ok(())
}
