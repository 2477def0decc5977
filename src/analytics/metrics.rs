//! Behavior analytics over a rolling window of user actions.
//!
//! One read pass over the window feeds everything: per-module usage and
//! efficiency, an hourly activity histogram in the user's timezone,
//! automation and workflow-consolidation opportunities, and knowledge
//! gaps. Scores are heuristic points on a 0-100 scale, anchored at a
//! baseline so a quiet user is not reported as maximally inefficient.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use serde::Serialize;

use crate::config::PolicyConfig;
use crate::db::FleetDb;
use crate::domain::Module;
use crate::error::CoreError;

/// Efficiency reported before any activity exists.
pub const BASELINE_EFFICIENCY: u32 = 40;

const DIVERSITY_POINTS: u32 = 8;
const DIVERSITY_CAP: u32 = 40;
const CADENCE_CAP: f64 = 30.0;
const CADENCE_HOURS_WEIGHT: f64 = 2.0;
const VOLUME_POINTS: u32 = 2;
const VOLUME_CAP: u32 = 30;
const OVERALL_MODULE_POINTS: u32 = 6;
const OVERALL_PAIR_POINTS: u32 = 2;
const OVERALL_PATTERN_POINTS: u32 = 5;
const MINUTES_SAVED_PER_REPETITION: f64 = 0.5;
const ERROR_ACTION_PREFIX: &str = "error";

/// Usage summary for one module within the window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleUsage {
    pub module: String,
    pub action_count: u32,
    pub distinct_action_types: u32,
    pub efficiency_score: u8,
}

/// Something the user could streamline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizationOpportunity {
    Automation {
        module: String,
        action_type: String,
        occurrences: u32,
        estimated_minutes_saved: f64,
    },
    WorkflowConsolidation {
        module_switches: u32,
    },
}

/// A place the user may be missing functionality or fighting the app.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KnowledgeGap {
    UnderusedModule { module: String, action_count: u32 },
    RecurringErrors { error_count: u32 },
}

/// The full analytics report for one user.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorAnalytics {
    pub user_id: String,
    pub window_days: u32,
    pub total_actions: u32,
    pub module_usage: Vec<ModuleUsage>,
    pub hourly_activity: [u32; 24],
    pub overall_efficiency: u8,
    pub optimization_opportunities: Vec<OptimizationOpportunity>,
    pub knowledge_gaps: Vec<KnowledgeGap>,
}

#[derive(Default)]
struct ModuleStats {
    count: u32,
    action_types: HashSet<String>,
    timestamps: Vec<String>,
}

/// Build the analytics report for a user over the policy window.
pub fn behavior_analytics(
    db: &FleetDb,
    policy: &PolicyConfig,
    user_id: &str,
) -> Result<BehaviorAnalytics, CoreError> {
    let since = (Utc::now() - Duration::days(i64::from(policy.analytics_window_days))).to_rfc3339();
    let actions = db.get_actions_since(user_id, &since)?;
    if actions.is_empty() {
        return Ok(BehaviorAnalytics {
            user_id: user_id.to_string(),
            window_days: policy.analytics_window_days,
            total_actions: 0,
            module_usage: Vec::new(),
            hourly_activity: [0; 24],
            overall_efficiency: BASELINE_EFFICIENCY as u8,
            optimization_opportunities: Vec::new(),
            knowledge_gaps: Vec::new(),
        });
    }

    let patterns = db.get_patterns_for_user(user_id)?;
    let tz: chrono_tz::Tz = policy.timezone.parse().unwrap_or(chrono_tz::UTC);

    let mut per_module: HashMap<String, ModuleStats> = HashMap::new();
    let mut pair_counts: HashMap<(String, String), u32> = HashMap::new();
    let mut hourly_activity = [0u32; 24];
    let mut module_switches = 0u32;
    let mut error_count = 0u32;
    let mut previous_module: Option<&str> = None;

    // Actions arrive oldest first, so consecutive rows are consecutive in time.
    for action in &actions {
        let stats = per_module.entry(action.module.clone()).or_default();
        stats.count += 1;
        stats.action_types.insert(action.action_type.clone());
        stats.timestamps.push(action.created_at.clone());

        *pair_counts
            .entry((action.module.clone(), action.action_type.clone()))
            .or_insert(0) += 1;

        if let Ok(ts) = DateTime::parse_from_rfc3339(&action.created_at) {
            hourly_activity[ts.with_timezone(&tz).hour() as usize] += 1;
        }
        if let Some(previous) = previous_module {
            if previous != action.module {
                module_switches += 1;
            }
        }
        previous_module = Some(&action.module);

        if action.action_type.starts_with(ERROR_ACTION_PREFIX) {
            error_count += 1;
        }
    }

    let mut module_usage: Vec<ModuleUsage> = per_module
        .into_iter()
        .map(|(module, stats)| {
            let distinct = stats.action_types.len() as u32;
            ModuleUsage {
                module,
                action_count: stats.count,
                distinct_action_types: distinct,
                efficiency_score: module_efficiency(
                    stats.count,
                    distinct,
                    average_gap_hours(&stats.timestamps),
                ),
            }
        })
        .collect();
    module_usage.sort_by(|a, b| {
        b.action_count
            .cmp(&a.action_count)
            .then_with(|| a.module.cmp(&b.module))
    });

    let mut optimization_opportunities = Vec::new();
    let mut heavy_pairs: Vec<(String, String, u32)> = pair_counts
        .iter()
        .filter(|(_, count)| **count > policy.automation_min_count)
        .map(|((module, action_type), count)| (module.clone(), action_type.clone(), *count))
        .collect();
    heavy_pairs.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| (&a.0, &a.1).cmp(&(&b.0, &b.1))));
    for (module, action_type, occurrences) in heavy_pairs {
        optimization_opportunities.push(OptimizationOpportunity::Automation {
            module,
            action_type,
            occurrences,
            estimated_minutes_saved: f64::from(occurrences) * MINUTES_SAVED_PER_REPETITION,
        });
    }
    if module_switches > policy.switch_flag_threshold {
        optimization_opportunities.push(OptimizationOpportunity::WorkflowConsolidation {
            module_switches,
        });
    }

    let mut knowledge_gaps = Vec::new();
    for module in Module::ALL {
        let action_count = module_usage
            .iter()
            .find(|usage| usage.module == module.as_str())
            .map(|usage| usage.action_count)
            .unwrap_or(0);
        if action_count < policy.low_usage_max {
            knowledge_gaps.push(KnowledgeGap::UnderusedModule {
                module: module.as_str().to_string(),
                action_count,
            });
        }
    }
    if error_count > policy.error_flag_threshold {
        knowledge_gaps.push(KnowledgeGap::RecurringErrors { error_count });
    }

    Ok(BehaviorAnalytics {
        user_id: user_id.to_string(),
        window_days: policy.analytics_window_days,
        total_actions: actions.len() as u32,
        overall_efficiency: overall_efficiency(
            module_usage.len() as u32,
            pair_counts.len() as u32,
            patterns.len() as u32,
        ),
        module_usage,
        hourly_activity,
        optimization_opportunities,
        knowledge_gaps,
    })
}

/// Score one module's usage: points for action diversity, for working in
/// steady short intervals, and for raw volume, each capped.
fn module_efficiency(action_count: u32, distinct_action_types: u32, avg_gap_hours: Option<f64>) -> u8 {
    let diversity = (distinct_action_types * DIVERSITY_POINTS).min(DIVERSITY_CAP);
    let cadence = match avg_gap_hours {
        Some(gap) => (CADENCE_CAP - gap * CADENCE_HOURS_WEIGHT).clamp(0.0, CADENCE_CAP) as u32,
        None => 0,
    };
    let volume = (action_count * VOLUME_POINTS).min(VOLUME_CAP);
    (diversity + cadence + volume).min(100) as u8
}

/// Mean hours between consecutive actions. Needs at least two parseable
/// timestamps.
fn average_gap_hours(timestamps: &[String]) -> Option<f64> {
    let mut parsed: Vec<DateTime<FixedOffset>> = timestamps
        .iter()
        .filter_map(|t| DateTime::parse_from_rfc3339(t).ok())
        .collect();
    if parsed.len() < 2 {
        return None;
    }
    parsed.sort();
    let total_hours: f64 = parsed
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / 3600.0)
        .sum();
    Some(total_hours / (parsed.len() - 1) as f64)
}

/// Overall score: the baseline plus points for breadth of modules, breadth
/// of distinct actions, and established patterns, capped at 100.
fn overall_efficiency(modules_used: u32, distinct_pairs: u32, pattern_count: u32) -> u8 {
    (BASELINE_EFFICIENCY
        + modules_used * OVERALL_MODULE_POINTS
        + distinct_pairs * OVERALL_PAIR_POINTS
        + pattern_count * OVERALL_PATTERN_POINTS)
        .min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::db::{DbBehaviorPattern, DbUserAction};

    fn seed_action(db: &FleetDb, id: &str, module: &str, action_type: &str, created_at: &str) {
        db.insert_user_action(&DbUserAction {
            id: id.to_string(),
            user_id: "u1".to_string(),
            session_id: None,
            module: module.to_string(),
            action_type: action_type.to_string(),
            context: None,
            page_url: None,
            metadata: None,
            created_at: created_at.to_string(),
        })
        .expect("seed action");
    }

    fn recent_stamp(minutes_ago: i64) -> String {
        (Utc::now() - Duration::minutes(minutes_ago)).to_rfc3339()
    }

    #[test]
    fn test_no_activity_returns_baseline() {
        let db = test_db();
        // A leftover pattern must not leak into an empty-window report.
        db.upsert_behavior_pattern(&DbBehaviorPattern {
            id: "bp-1".to_string(),
            user_id: "u1".to_string(),
            module: "maintenance".to_string(),
            pattern_type: "frequent_action".to_string(),
            pattern_data: "{}".to_string(),
            frequency: 12,
            confidence: 1.0,
            last_occurrence: Utc::now().to_rfc3339(),
            updated_at: Utc::now().to_rfc3339(),
        })
        .expect("seed pattern");

        let report = behavior_analytics(&db, &PolicyConfig::default(), "u1").expect("report");
        assert_eq!(report.total_actions, 0);
        assert_eq!(report.overall_efficiency, BASELINE_EFFICIENCY as u8);
        assert!(report.module_usage.is_empty());
        assert!(report.optimization_opportunities.is_empty());
        assert!(report.knowledge_gaps.is_empty());
        assert_eq!(report.hourly_activity, [0u32; 24]);
    }

    #[test]
    fn test_module_efficiency_scoring() {
        // 2 types (16) + one-minute cadence (29) + 4 actions (8).
        assert_eq!(module_efficiency(4, 2, Some(1.0 / 60.0)), 53);
        // Single action has no cadence.
        assert_eq!(module_efficiency(1, 1, None), 10);
        // All three components at their caps.
        assert_eq!(module_efficiency(100, 10, Some(0.0)), 100);
    }

    #[test]
    fn test_overall_efficiency_scoring() {
        assert_eq!(overall_efficiency(0, 0, 0), BASELINE_EFFICIENCY as u8);
        assert_eq!(overall_efficiency(2, 3, 1), 63);
        assert_eq!(overall_efficiency(7, 20, 4), 100);
    }

    #[test]
    fn test_average_gap_needs_two_timestamps() {
        assert_eq!(average_gap_hours(&["2026-06-01T10:00:00+00:00".to_string()]), None);

        // Out of order on purpose.
        let gap = average_gap_hours(&[
            "2026-06-01T12:00:00+00:00".to_string(),
            "2026-06-01T10:00:00+00:00".to_string(),
            "2026-06-01T11:00:00+00:00".to_string(),
        ])
        .expect("gap");
        assert!((gap - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_automation_opportunity_needs_strict_excess() {
        let db = test_db();
        for i in 0..4 {
            seed_action(&db, &format!("a-{i}"), "maintenance", "log_task", &recent_stamp(40 - i));
        }
        for i in 0..3 {
            seed_action(&db, &format!("b-{i}"), "maintenance", "inspect", &recent_stamp(20 - i));
        }

        let policy = PolicyConfig {
            automation_min_count: 3,
            ..Default::default()
        };
        let report = behavior_analytics(&db, &policy, "u1").expect("report");

        assert!(report.optimization_opportunities.contains(
            &OptimizationOpportunity::Automation {
                module: "maintenance".to_string(),
                action_type: "log_task".to_string(),
                occurrences: 4,
                estimated_minutes_saved: 2.0,
            }
        ));
        // Exactly at the floor is not flagged.
        assert!(!report.optimization_opportunities.iter().any(|o| matches!(
            o,
            OptimizationOpportunity::Automation { action_type, .. } if action_type == "inspect"
        )));
    }

    #[test]
    fn test_module_switching_is_flagged() {
        let db = test_db();
        let modules = ["maintenance", "inventory", "maintenance", "inventory"];
        for (i, module) in modules.iter().enumerate() {
            seed_action(&db, &format!("a-{i}"), module, "open", &recent_stamp(40 - i as i64));
        }

        let policy = PolicyConfig {
            switch_flag_threshold: 2,
            ..Default::default()
        };
        let report = behavior_analytics(&db, &policy, "u1").expect("report");
        assert!(report
            .optimization_opportunities
            .contains(&OptimizationOpportunity::WorkflowConsolidation { module_switches: 3 }));
    }

    #[test]
    fn test_recurring_errors_are_flagged() {
        let db = test_db();
        for i in 0..3 {
            seed_action(&db, &format!("e-{i}"), "finance", "error_save", &recent_stamp(30 - i));
        }
        seed_action(&db, "ok-1", "finance", "create_invoice", &recent_stamp(10));

        let flagged = behavior_analytics(
            &db,
            &PolicyConfig {
                error_flag_threshold: 2,
                ..Default::default()
            },
            "u1",
        )
        .expect("report");
        assert!(flagged
            .knowledge_gaps
            .contains(&KnowledgeGap::RecurringErrors { error_count: 3 }));

        // Under the default threshold the same activity passes quietly.
        let quiet = behavior_analytics(&db, &PolicyConfig::default(), "u1").expect("report");
        assert!(!quiet
            .knowledge_gaps
            .iter()
            .any(|g| matches!(g, KnowledgeGap::RecurringErrors { .. })));
    }

    #[test]
    fn test_underused_modules_are_reported() {
        let db = test_db();
        for i in 0..5 {
            seed_action(&db, &format!("a-{i}"), "maintenance", "log_task", &recent_stamp(30 - i));
        }

        let report = behavior_analytics(&db, &PolicyConfig::default(), "u1").expect("report");
        assert!(report.knowledge_gaps.contains(&KnowledgeGap::UnderusedModule {
            module: "inventory".to_string(),
            action_count: 0,
        }));
        assert!(!report.knowledge_gaps.iter().any(|g| matches!(
            g,
            KnowledgeGap::UnderusedModule { module, .. } if module == "maintenance"
        )));
    }

    #[test]
    fn test_hourly_histogram_uses_policy_timezone() {
        let db = test_db();
        let nine_utc = Utc::now()
            .date_naive()
            .and_hms_opt(9, 0, 0)
            .expect("time")
            .and_utc()
            .to_rfc3339();
        seed_action(&db, "a-1", "crew", "roster_check", &nine_utc);

        let report = behavior_analytics(&db, &PolicyConfig::default(), "u1").expect("report");
        assert_eq!(report.hourly_activity[9], 1);
        assert_eq!(report.hourly_activity.iter().sum::<u32>(), 1);
    }

    #[test]
    fn test_module_usage_is_sorted_by_volume() {
        let db = test_db();
        seed_action(&db, "a-1", "inventory", "adjust_stock", &recent_stamp(50));
        for i in 0..3 {
            seed_action(&db, &format!("b-{i}"), "maintenance", "log_task", &recent_stamp(30 - i));
        }

        let report = behavior_analytics(&db, &PolicyConfig::default(), "u1").expect("report");
        assert_eq!(report.module_usage.len(), 2);
        assert_eq!(report.module_usage[0].module, "maintenance");
        assert_eq!(report.module_usage[0].action_count, 3);
        assert_eq!(report.module_usage[1].module, "inventory");
        assert_eq!(report.total_actions, 4);
    }
}
