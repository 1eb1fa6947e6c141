//! Estimate commands

use anyhow::Result;
use colored::Colorize;
use estimator_lib::{
    EstimatorSession, RecomputeRequest, RecomputeResponse, Scenario, StructuredLogger,
};
use std::path::Path;
use tabled::Tabled;

use super::{read_json, write_json, Backend};
use crate::output::{
    color_savings, format_currency, format_gb, format_percent, print_heading, print_info,
    print_json, print_table, print_warning, OutputFormat,
};

#[derive(Tabled)]
struct TierRow {
    #[tabled(rename = "Tier")]
    tier: &'static str,
    #[tabled(rename = "Nodes")]
    nodes: u32,
    #[tabled(rename = "Instance Class")]
    instance_class: String,
}

#[derive(Tabled)]
struct CostRow {
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Monthly")]
    monthly: String,
}

/// Load the saved session state, or start fresh
fn load_state(state_path: Option<&Path>) -> Result<RecomputeRequest> {
    match state_path {
        Some(path) if path.exists() => read_json(path),
        _ => Ok(RecomputeRequest::default()),
    }
}

/// Estimate a scenario file, carrying history through an optional state file
pub async fn run_estimate(
    backend: &Backend,
    scenario_path: &Path,
    state_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let scenario: Scenario = read_json(scenario_path)?;

    let response = match backend {
        Backend::Remote(client) => {
            if state_path.is_some() {
                print_warning("--state is ignored with --api-url; the service keeps its own history");
            }
            client.put("api/v1/scenario", &scenario).await?
        }
        Backend::Local { catalog } => {
            let request = load_state(state_path)?;
            let mut session =
                EstimatorSession::with_request(catalog.clone(), request, StructuredLogger::new("mce"));
            let response = session.update_scenario(scenario)?.clone();
            if let Some(path) = state_path {
                write_json(path, session.request())?;
            }
            response
        }
    };

    match format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Table => {
            print_estimate(&response);
            Ok(())
        }
    }
}

/// Print a starter scenario to edit
pub fn print_sample() -> Result<()> {
    print_json(&Scenario::default())
}

fn print_estimate(response: &RecomputeResponse) {
    let source = &response.profile.source;
    let target = &response.target;
    let selection = &response.selection;

    print_heading("Migration Estimate", '=');
    println!(
        "Source:                 {} x {} ({})",
        source.instance_class.cyan(),
        source.instance_count,
        format_gb(source.storage_gb)
    );
    println!("Workload:               {}", response.profile.workload.workload_type);
    println!();

    print_heading("Target Topology", '-');
    let analytics_class = if target.use_analytics_tier {
        selection.analytics.clone()
    } else {
        "-".to_string()
    };
    print_table(
        vec![
            TierRow { tier: "SQL", nodes: target.sql_nodes, instance_class: selection.sql.clone() },
            TierRow {
                tier: "Storage",
                nodes: target.storage_nodes,
                instance_class: selection.storage.clone(),
            },
            TierRow {
                tier: "Placement",
                nodes: target.placement_nodes,
                instance_class: selection.placement.clone(),
            },
            TierRow {
                tier: "Analytics",
                nodes: target.analytics_nodes,
                instance_class: analytics_class,
            },
            TierRow { tier: "Monitoring", nodes: 1, instance_class: selection.monitoring.clone() },
        ],
        "No tiers",
    );
    println!(
        "Worker nodes: {}   Replication factor: {}",
        target.worker_node_count, target.replication_factor
    );
    println!();

    print_heading("Monthly Cost Breakdown", '-');
    let rows: Vec<CostRow> = response
        .breakdown
        .iter()
        .map(|line| CostRow {
            item: line.label.clone(),
            monthly: format_currency(line.monthly_value),
        })
        .collect();
    print_table(rows, "No cost lines");
    println!();

    println!("Target monthly cost:    {}", format_currency(response.total_monthly_cost).bold());
    println!("Source monthly cost:    {}", format_currency(response.source_monthly_cost));
    println!(
        "{} {} ({})",
        "Monthly savings:       ".bold(),
        color_savings(response.savings_amount),
        format_percent(response.savings_percent)
    );
    println!("Payback:                {}", response.payback);
    println!("Operations staff:       {:.1} FTE", response.staff_fte);

    if response.history_appended {
        if let Some(entry) = response.history.latest() {
            println!();
            print_info(&format!(
                "Recorded change #{}: {} -> {} (SQL nodes {}, storage nodes {})",
                entry.sequence_id,
                entry.from_instance_class,
                entry.to_instance_class,
                entry.sql_nodes_delta,
                entry.storage_nodes_delta
            ));
        }
    }

    if !response.warnings.is_empty() {
        println!();
        for warning in &response.warnings {
            print_warning(&warning.to_string());
        }
    }
}
