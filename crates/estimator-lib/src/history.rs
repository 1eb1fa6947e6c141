//! Bounded log of topology changes caused by source instance class edits
//!
//! - At most [`MAX_HISTORY_ENTRIES`] entries with FIFO eviction
//! - Sequence ids keep counting across evictions and restart only on an
//!   empty log
//! - The "from" side of an entry is the previous entry's result, or the
//!   baseline cluster for the first entry

use crate::catalog::{Catalog, DEFAULT_SQL_INSTANCE_CLASS};
use crate::models::{InstanceSelection, TargetTopology};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of retained transitions
pub const MAX_HISTORY_ENTRIES: usize = 10;

pub const BASELINE_SQL_NODES: u32 = 3;
pub const BASELINE_STORAGE_NODES: u32 = 3;

/// One recorded source instance class transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sequence_id: u64,
    pub from_instance_class: String,
    pub to_instance_class: String,
    pub vcpu_delta: String,
    pub memory_delta: String,
    pub sql_nodes_delta: String,
    pub storage_nodes_delta: String,
    pub instance_class_delta: String,
    pub resulting_monthly_cost: f64,
    pub resulting_sql_nodes: u32,
    pub resulting_storage_nodes: u32,
    pub resulting_sql_instance_class: String,
}

/// FIFO-bounded change log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<HistoryEntry>", into = "Vec<HistoryEntry>")]
pub struct ChangeHistory {
    entries: VecDeque<HistoryEntry>,
}

impl From<Vec<HistoryEntry>> for ChangeHistory {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        let mut entries: VecDeque<HistoryEntry> = entries.into();
        while entries.len() > MAX_HISTORY_ENTRIES {
            entries.pop_front();
        }
        Self { entries }
    }
}

impl From<ChangeHistory> for Vec<HistoryEntry> {
    fn from(history: ChangeHistory) -> Self {
        history.entries.into()
    }
}

impl ChangeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    fn push(&mut self, entry: HistoryEntry) {
        while self.entries.len() >= MAX_HISTORY_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }
}

fn count_delta(from: u32, to: u32) -> String {
    if from == to {
        format!("{} (no change)", to)
    } else {
        format!("{} → {} ({:+})", from, to, i64::from(to) - i64::from(from))
    }
}

fn memory_delta(from: f64, to: f64) -> String {
    if from == to {
        format!("{}GB (no change)", to)
    } else {
        format!("{}GB → {}GB ({:+}GB)", from, to, to - from)
    }
}

fn class_delta(from: &str, to: &str) -> String {
    if from == to {
        format!("{} (no change)", to)
    } else {
        format!("{} → {}", from, to)
    }
}

/// Append a transition if the source instance class changed
///
/// Returns `prior` untouched when there is no previous class or it equals
/// the new one.
pub fn record(
    previous_instance_class: Option<&str>,
    new_instance_class: &str,
    topology: &TargetTopology,
    selection: &InstanceSelection,
    resulting_monthly_cost: f64,
    catalog: &Catalog,
    prior: ChangeHistory,
) -> ChangeHistory {
    let previous = match previous_instance_class {
        Some(previous) if previous != new_instance_class => previous,
        _ => return prior,
    };

    // Fallback warnings for the source classes are reported by the derivation
    let mut ignored = Vec::new();
    let from_spec = catalog.resolve_instance(previous, &mut ignored);
    let to_spec = catalog.resolve_instance(new_instance_class, &mut ignored);

    let (from_sql, from_storage, from_class, next_id) = match prior.latest() {
        Some(last) => (
            last.resulting_sql_nodes,
            last.resulting_storage_nodes,
            last.resulting_sql_instance_class.clone(),
            last.sequence_id + 1,
        ),
        None => (
            BASELINE_SQL_NODES,
            BASELINE_STORAGE_NODES,
            DEFAULT_SQL_INSTANCE_CLASS.to_string(),
            1,
        ),
    };

    let entry = HistoryEntry {
        sequence_id: next_id,
        from_instance_class: previous.to_string(),
        to_instance_class: new_instance_class.to_string(),
        vcpu_delta: count_delta(from_spec.compute_units, to_spec.compute_units),
        memory_delta: memory_delta(from_spec.memory_gb, to_spec.memory_gb),
        sql_nodes_delta: count_delta(from_sql, topology.sql_nodes),
        storage_nodes_delta: count_delta(from_storage, topology.storage_nodes),
        instance_class_delta: class_delta(&from_class, &selection.sql),
        resulting_monthly_cost,
        resulting_sql_nodes: topology.sql_nodes,
        resulting_storage_nodes: topology.storage_nodes,
        resulting_sql_instance_class: selection.sql.clone(),
    };

    let mut history = prior;
    history.push(entry);
    history
}
