//! Change history command

use anyhow::Result;
use estimator_lib::{ChangeHistory, HistoryEntry, RecomputeRequest};
use std::path::Path;
use tabled::Tabled;

use super::{read_json, write_json, Backend};
use crate::output::{format_currency, print_json, print_success, print_table, OutputFormat};

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "#")]
    sequence_id: u64,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "vCPU")]
    vcpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "SQL Nodes")]
    sql_nodes: String,
    #[tabled(rename = "Storage Nodes")]
    storage_nodes: String,
    #[tabled(rename = "SQL Class")]
    sql_class: String,
    #[tabled(rename = "Monthly")]
    monthly: String,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            sequence_id: entry.sequence_id,
            from: entry.from_instance_class.clone(),
            to: entry.to_instance_class.clone(),
            vcpu: entry.vcpu_delta.clone(),
            memory: entry.memory_delta.clone(),
            sql_nodes: entry.sql_nodes_delta.clone(),
            storage_nodes: entry.storage_nodes_delta.clone(),
            sql_class: entry.instance_class_delta.clone(),
            monthly: format_currency(entry.resulting_monthly_cost),
        }
    }
}

fn require_state(state_path: Option<&Path>) -> Result<&Path> {
    state_path.ok_or_else(|| anyhow::anyhow!("--state is required without --api-url"))
}

/// Show, or clear, the source instance class change log
pub async fn show_history(
    backend: &Backend,
    state_path: Option<&Path>,
    clear: bool,
    format: OutputFormat,
) -> Result<()> {
    if clear {
        match backend {
            Backend::Remote(client) => client.delete("api/v1/history").await?,
            Backend::Local { .. } => {
                let path = require_state(state_path)?;
                let mut state: RecomputeRequest = read_json(path)?;
                state.history = ChangeHistory::new();
                write_json(path, &state)?;
            }
        }
        print_success("Change history cleared");
        return Ok(());
    }

    let history: ChangeHistory = match backend {
        Backend::Remote(client) => client.get("api/v1/history").await?,
        Backend::Local { .. } => {
            let path = require_state(state_path)?;
            if path.exists() {
                read_json::<RecomputeRequest>(path)?.history
            } else {
                ChangeHistory::new()
            }
        }
    };

    match format {
        OutputFormat::Json => print_json(&history)?,
        OutputFormat::Table => print_table(
            history.iter().map(HistoryRow::from).collect(),
            "No instance class changes recorded",
        ),
    }

    Ok(())
}
