//! Single entry point that turns a complete prior state into the next one
//!
//! `recompute` validates the input, derives the topology, prices it and
//! appends to the change history when the source instance class moved. It
//! holds no state of its own; callers keep the returned state between calls.
//!
//! The SQL instance class chosen by derivation replaces the caller's
//! selection when there is none, or when the source or workload differs from
//! `previous_profile`. Otherwise a manual override stands.

use crate::catalog::{Catalog, CatalogWarning};
use crate::cost::aggregate;
use crate::error::Result;
use crate::history::{self, ChangeHistory};
use crate::models::{
    CostBreakdown, InstanceSelection, OperationalConfig, Payback, SourceProfile, StorageConfig,
    TargetTopology, WorkloadProfile,
};
use crate::topology::derive;
use crate::validation::{validate_operational, validate_source, validate_storage, validate_workload};
use serde::{Deserialize, Serialize};

/// Everything a caller edits between recomputations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub source: SourceProfile,
    pub workload: WorkloadProfile,
    #[serde(default)]
    pub target: TargetTopology,
    /// Instance classes to keep; `None` takes the derived classes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<InstanceSelection>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub operational: OperationalConfig,
}

/// Source and workload as seen by the last derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub source: SourceProfile,
    pub workload: WorkloadProfile,
}

/// Complete prior state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecomputeRequest {
    #[serde(flatten)]
    pub scenario: Scenario,
    #[serde(default)]
    pub history: ChangeHistory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_profile: Option<ProfileSnapshot>,
}

impl RecomputeRequest {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            history: ChangeHistory::new(),
            previous_profile: None,
        }
    }

    /// Carry a response forward as the prior state of the next call
    pub fn apply(&mut self, response: &RecomputeResponse) {
        self.scenario.target = response.target;
        self.scenario.selection = Some(response.selection.clone());
        self.history = response.history.clone();
        self.previous_profile = Some(response.profile.clone());
    }
}

/// Complete next state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecomputeResponse {
    pub target: TargetTopology,
    pub selection: InstanceSelection,
    pub breakdown: CostBreakdown,
    pub total_monthly_cost: f64,
    pub source_monthly_cost: f64,
    pub savings_amount: f64,
    pub savings_percent: f64,
    pub payback: Payback,
    pub history: ChangeHistory,
    pub profile: ProfileSnapshot,
    /// Whether the source or workload changed since the previous call
    pub profile_changed: bool,
    /// Whether this call appended a history entry
    pub history_appended: bool,
    pub staff_fte: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<CatalogWarning>,
}

/// Derive, price and record one state transition
pub fn recompute(catalog: &Catalog, request: RecomputeRequest) -> Result<RecomputeResponse> {
    let RecomputeRequest {
        scenario,
        history: prior_history,
        previous_profile,
    } = request;

    validate_source(&scenario.source)?;
    validate_workload(&scenario.workload)?;
    validate_storage(&scenario.storage)?;
    validate_operational(&scenario.operational)?;

    let profile = ProfileSnapshot {
        source: scenario.source.clone(),
        workload: scenario.workload.clone(),
    };
    let profile_changed = previous_profile.as_ref() != Some(&profile);

    let current_selection = scenario.selection.clone().unwrap_or_default();
    let derivation = derive(
        &scenario.source,
        &scenario.workload,
        &scenario.target,
        &current_selection,
        catalog,
    )?;
    let mut warnings = derivation.warnings;
    let topology = derivation.topology;
    let selection = match scenario.selection {
        Some(kept) if !profile_changed => kept,
        _ => derivation.selection,
    };

    let aggregation = aggregate(
        &topology,
        &selection,
        &scenario.storage,
        &scenario.operational,
        scenario.source.monthly_cost,
        catalog,
    );
    warnings.extend(aggregation.warnings);
    warnings.sort();
    warnings.dedup();
    let summary = aggregation.summary;

    let prior_len = prior_history.len();
    let prior_latest = prior_history.latest().map(|e| e.sequence_id);
    let history = history::record(
        previous_profile
            .as_ref()
            .map(|p| p.source.instance_class.as_str()),
        &scenario.source.instance_class,
        &topology,
        &selection,
        summary.total_monthly_cost,
        catalog,
        prior_history,
    );
    let history_appended =
        history.len() != prior_len || history.latest().map(|e| e.sequence_id) != prior_latest;

    Ok(RecomputeResponse {
        target: topology,
        selection,
        breakdown: summary.breakdown,
        total_monthly_cost: summary.total_monthly_cost,
        source_monthly_cost: summary.source_monthly_cost,
        savings_amount: summary.savings_amount,
        savings_percent: summary.savings_percent,
        payback: summary.payback,
        history,
        profile,
        profile_changed,
        history_appended,
        staff_fte: scenario.operational.staff_fte,
        warnings,
    })
}
