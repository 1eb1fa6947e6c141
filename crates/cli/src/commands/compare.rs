//! Reference comparison command

use anyhow::Result;
use estimator_lib::{compare_reference_set, ComparisonRow};
use tabled::Tabled;

use super::Backend;
use crate::output::{
    color_savings, format_currency, format_gb, format_percent, print_heading, print_json,
    print_table, print_warning, OutputFormat,
};

#[derive(Tabled)]
struct ComparisonTableRow {
    #[tabled(rename = "Profile")]
    label: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "vCPU / Memory")]
    shape: String,
    #[tabled(rename = "Data")]
    data: String,
    #[tabled(rename = "Source $/mo")]
    source_cost: String,
    #[tabled(rename = "SQL")]
    sql: String,
    #[tabled(rename = "Storage")]
    storage: String,
    #[tabled(rename = "Target $/mo")]
    target_cost: String,
    #[tabled(rename = "Savings")]
    savings: String,
    #[tabled(rename = "Payback")]
    payback: String,
}

impl From<&ComparisonRow> for ComparisonTableRow {
    fn from(row: &ComparisonRow) -> Self {
        Self {
            label: row.label.clone(),
            source: format!("{} x {}", row.source_instance_class, row.source_instance_count),
            shape: format!("{} / {:.0} GB", row.source_vcpu, row.source_memory_gb),
            data: format_gb(row.storage_gb),
            source_cost: format_currency(row.source_monthly_cost),
            sql: format!("{} x {}", row.topology.sql_nodes, row.selection.sql),
            storage: format!("{} x {}", row.topology.storage_nodes, row.selection.storage),
            target_cost: format_currency(row.target_monthly_cost),
            savings: format!(
                "{} ({})",
                color_savings(row.savings_amount),
                format_percent(row.savings_percent)
            ),
            payback: row.payback.to_string(),
        }
    }
}

/// Show baseline estimates for the reference configurations
pub async fn show_comparison(backend: &Backend, format: OutputFormat) -> Result<()> {
    let rows: Vec<ComparisonRow> = match backend {
        Backend::Remote(client) => client.get("api/v1/comparison").await?,
        Backend::Local { catalog } => compare_reference_set(catalog)?,
    };

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Table => {
            print_heading("Reference Comparison (baseline sizing)", '=');
            print_table(
                rows.iter().map(ComparisonTableRow::from).collect(),
                "No reference configurations",
            );
            for row in &rows {
                for warning in &row.warnings {
                    print_warning(&format!("{}: {}", row.label, warning));
                }
            }
        }
    }

    Ok(())
}
