//! Usage analytics: tracking, pattern mining, suggestions, and reporting.

pub mod metrics;
pub mod patterns;
pub mod suggestions;
pub mod tracker;
pub mod worker;

pub use metrics::{behavior_analytics, BehaviorAnalytics};
pub use patterns::analyze_patterns;
pub use suggestions::{
    act_on_suggestion, active_suggestions, dismiss_suggestion, generate_suggestions,
};
pub use tracker::{track_action, NewUserAction, ANONYMOUS_USER};
pub use worker::{AnalysisPriority, AnalysisQueue, AnalysisWorker};

use serde::Serialize;

use crate::config::PolicyConfig;
use crate::db::FleetDb;
use crate::error::CoreError;

/// What one analysis pass did for a user.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub patterns_updated: usize,
    pub suggestions_created: usize,
}

/// Run a full analysis pass for one user: mine patterns from recent
/// actions, then derive suggestions from the result.
pub fn run_user_analysis(
    db: &FleetDb,
    policy: &PolicyConfig,
    user_id: &str,
) -> Result<AnalysisSummary, CoreError> {
    let patterns_updated = patterns::analyze_patterns(db, policy, user_id)?;
    let suggestions_created = suggestions::generate_suggestions(db, policy, user_id)?;
    Ok(AnalysisSummary {
        patterns_updated,
        suggestions_created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;

    #[test]
    fn test_tracked_actions_flow_through_to_suggestions() {
        let db = test_db();
        let queue = AnalysisQueue::default();
        let policy = PolicyConfig::default();

        for _ in 0..12 {
            track_action(
                &db,
                &queue,
                NewUserAction {
                    user_id: "u1".to_string(),
                    module: "maintenance".to_string(),
                    action_type: "log_task".to_string(),
                    ..Default::default()
                },
            )
            .expect("track");
        }

        let summary = run_user_analysis(&db, &policy, "u1").expect("analysis");
        assert_eq!(summary.patterns_updated, 1);
        assert_eq!(summary.suggestions_created, 1);

        let live = active_suggestions(&db, "u1").expect("active");
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].module, "maintenance");

        // A second pass recomputes the pattern but respects the live suggestion.
        let summary = run_user_analysis(&db, &policy, "u1").expect("second analysis");
        assert_eq!(summary.patterns_updated, 1);
        assert_eq!(summary.suggestions_created, 0);
    }
}
