//! Stateful estimator session
//!
//! Owns the caller state between recomputations. Every edit is applied to a
//! copy, recomputed, and committed only if the recomputation succeeds, so a
//! rejected edit leaves the session exactly as it was. Wrap the session in a
//! mutex to serve several callers; one edit plus its history append is a
//! single `&mut self` call.

use crate::catalog::Catalog;
use crate::engine::{recompute, RecomputeRequest, RecomputeResponse, Scenario};
use crate::error::Result;
use crate::history::ChangeHistory;
use crate::models::{InstanceSelection, SourceProfile, WorkloadProfile};
use crate::observability::{EstimatorMetrics, StructuredLogger};
use std::sync::Arc;
use std::time::Instant;

pub struct EstimatorSession {
    catalog: Arc<Catalog>,
    request: RecomputeRequest,
    last: Option<RecomputeResponse>,
    metrics: EstimatorMetrics,
    logger: StructuredLogger,
}

impl EstimatorSession {
    pub fn new(catalog: Arc<Catalog>, logger: StructuredLogger) -> Self {
        Self::with_request(catalog, RecomputeRequest::default(), logger)
    }

    /// Resume from a previously saved state
    pub fn with_request(
        catalog: Arc<Catalog>,
        request: RecomputeRequest,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            catalog,
            request,
            last: None,
            metrics: EstimatorMetrics::new(),
            logger,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// State that the next recomputation starts from
    pub fn request(&self) -> &RecomputeRequest {
        &self.request
    }

    pub fn last(&self) -> Option<&RecomputeResponse> {
        self.last.as_ref()
    }

    pub fn history(&self) -> &ChangeHistory {
        &self.request.history
    }

    /// Recompute with the current state
    pub fn recompute(&mut self) -> Result<&RecomputeResponse> {
        let candidate = self.request.clone();
        self.commit(candidate)
    }

    /// Replace every caller-edited input
    ///
    /// A scenario without a selection keeps the session's current classes.
    pub fn update_scenario(&mut self, scenario: Scenario) -> Result<&RecomputeResponse> {
        let mut candidate = self.request.clone();
        let selection = scenario.selection.or(candidate.scenario.selection.take());
        candidate.scenario = Scenario {
            selection,
            ..scenario
        };
        self.commit(candidate)
    }

    pub fn update_source(&mut self, source: SourceProfile) -> Result<&RecomputeResponse> {
        let mut candidate = self.request.clone();
        candidate.scenario.source = source;
        self.commit(candidate)
    }

    pub fn update_workload(&mut self, workload: WorkloadProfile) -> Result<&RecomputeResponse> {
        let mut candidate = self.request.clone();
        candidate.scenario.workload = workload;
        self.commit(candidate)
    }

    /// Manually override instance classes; kept until the next profile change
    pub fn override_selection(&mut self, selection: InstanceSelection) -> Result<&RecomputeResponse> {
        let mut candidate = self.request.clone();
        candidate.scenario.selection = Some(selection);
        self.commit(candidate)
    }

    /// Empty the change log; sequence ids restart at 1
    pub fn clear_history(&mut self) {
        self.request.history = ChangeHistory::new();
        if let Some(last) = self.last.as_mut() {
            last.history = ChangeHistory::new();
        }
        self.metrics.set_history_entries(0);
    }

    fn commit(&mut self, candidate: RecomputeRequest) -> Result<&RecomputeResponse> {
        let started = Instant::now();
        let response = match recompute(&self.catalog, candidate.clone()) {
            Ok(response) => response,
            Err(e) => {
                if e.is_invalid_configuration() {
                    self.metrics.inc_invalid_configurations();
                }
                self.logger.log_invalid_configuration(&e.to_string());
                return Err(e);
            }
        };
        let elapsed = started.elapsed().as_secs_f64();

        for warning in &response.warnings {
            self.logger.log_catalog_fallback(warning);
        }
        if response.history_appended {
            if let Some(entry) = response.history.latest() {
                self.logger.log_instance_class_change(entry);
            }
        }
        self.logger.log_recompute(
            &response.profile.source.instance_class,
            response.target.sql_nodes,
            response.target.storage_nodes,
            response.target.analytics_nodes,
            response.total_monthly_cost,
            response.savings_percent,
            elapsed,
        );

        self.metrics.observe_recompute_latency(elapsed);
        self.metrics.inc_recomputations();
        self.metrics.add_catalog_fallbacks(response.warnings.len());
        self.metrics.set_history_entries(response.history.len());
        self.metrics
            .set_last_estimate(response.total_monthly_cost, response.savings_amount);

        let mut next = candidate;
        next.apply(&response);
        self.request = next;
        Ok(self.last.insert(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MAX_HISTORY_ENTRIES;

    fn session() -> EstimatorSession {
        EstimatorSession::new(Arc::new(Catalog::builtin()), StructuredLogger::new("test"))
    }

    #[test]
    fn test_recompute_populates_last() {
        let mut session = session();
        assert!(session.last().is_none());

        let total = session.recompute().unwrap().total_monthly_cost;
        assert!(total > 0.0);
        assert_eq!(session.last().unwrap().total_monthly_cost, total);
        assert!(session.request().previous_profile.is_some());
    }

    #[test]
    fn test_rejected_edit_leaves_state_untouched() {
        let mut session = session();
        session.recompute().unwrap();
        let before = session.request().clone();

        let broken = SourceProfile {
            instance_count: 0,
            ..SourceProfile::default()
        };
        assert!(session.update_source(broken).is_err());
        assert_eq!(session.request(), &before);
    }

    #[test]
    fn test_history_bounded_through_session() {
        let mut session = session();
        session.recompute().unwrap();

        let classes = ["db.r5.large", "db.r5.2xlarge", "db.r5.4xlarge"];
        for i in 0..13 {
            let source = SourceProfile {
                instance_class: classes[i % classes.len()].to_string(),
                ..session.request().scenario.source.clone()
            };
            session.update_source(source).unwrap();
        }

        let history = session.history();
        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history.latest().unwrap().sequence_id, 13);
        assert_eq!(history.iter().next().unwrap().sequence_id, 4);
    }

    #[test]
    fn test_clear_history_restarts_sequence() {
        let mut session = session();
        session.recompute().unwrap();
        session
            .update_source(SourceProfile {
                instance_class: "db.r5.large".to_string(),
                ..SourceProfile::default()
            })
            .unwrap();
        assert_eq!(session.history().len(), 1);

        session.clear_history();
        assert!(session.history().is_empty());

        session
            .update_source(SourceProfile {
                instance_class: "db.r5.2xlarge".to_string(),
                ..SourceProfile::default()
            })
            .unwrap();
        assert_eq!(session.history().latest().unwrap().sequence_id, 1);
    }

    #[test]
    fn test_override_selection_is_kept() {
        let mut session = session();
        session.recompute().unwrap();

        let selection = InstanceSelection {
            sql: "m5.4xlarge".to_string(),
            ..session.request().scenario.selection.clone().unwrap_or_default()
        };
        let response = session.override_selection(selection).unwrap();
        assert_eq!(response.selection.sql, "m5.4xlarge");

        let response = session.recompute().unwrap();
        assert_eq!(response.selection.sql, "m5.4xlarge");
    }

    #[test]
    fn test_repeated_scenario_gives_same_estimate() {
        let mut session = session();
        let scenario = Scenario {
            source: SourceProfile {
                instance_class: "db.r5.4xlarge".to_string(),
                ..SourceProfile::default()
            },
            ..Scenario::default()
        };

        let first = session.update_scenario(scenario.clone()).unwrap().clone();
        let second = session.update_scenario(scenario).unwrap().clone();

        assert_eq!(first.selection.sql, "r5.4xlarge");
        assert_eq!(second.selection, first.selection);
        assert_eq!(second.target, first.target);
        assert_eq!(second.total_monthly_cost, first.total_monthly_cost);
        assert!(!second.history_appended);
    }

    #[test]
    fn test_scenario_without_selection_keeps_override() {
        let mut session = session();
        session.recompute().unwrap();
        let selection = InstanceSelection {
            sql: "m5.4xlarge".to_string(),
            ..InstanceSelection::default()
        };
        session.override_selection(selection).unwrap();

        let scenario = Scenario {
            selection: None,
            ..session.request().scenario.clone()
        };
        let response = session.update_scenario(scenario).unwrap();
        assert_eq!(response.selection.sql, "m5.4xlarge");
    }

    #[test]
    fn test_update_workload_enables_analytics() {
        let mut session = session();
        let workload = WorkloadProfile {
            workload_type: crate::models::WorkloadType::Mixed,
            ..WorkloadProfile::default()
        };
        let response = session.update_workload(workload).unwrap();
        assert!(response.target.use_analytics_tier);
        assert!(response.target.analytics_nodes >= 2);
    }
}
