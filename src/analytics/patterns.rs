//! Pattern mining over recent user actions.
//!
//! Looks at a fixed window of the user's latest actions, finds the
//! dominant action per module, and upserts one `frequent_action` pattern
//! per module that clears the repetition floor. Each run recomputes from
//! the window, so a pattern's frequency reflects current behavior rather
//! than growing forever.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::db::{DbBehaviorPattern, FleetDb};
use crate::domain::{PatternData, PatternKind};
use crate::error::CoreError;

/// Repetitions at which confidence saturates at 1.0.
const FULL_CONFIDENCE_COUNT: f64 = 10.0;

/// Mine the user's recent actions and upsert the patterns found.
///
/// Returns the number of patterns written.
pub fn analyze_patterns(
    db: &FleetDb,
    policy: &PolicyConfig,
    user_id: &str,
) -> Result<usize, CoreError> {
    let actions = db.get_recent_actions(user_id, i64::from(policy.pattern_window))?;
    if actions.is_empty() {
        return Ok(0);
    }

    // Count (module, action_type) pairs and keep each pair's latest timestamp.
    let mut counts: HashMap<(String, String), (u32, String)> = HashMap::new();
    for action in &actions {
        let entry = counts
            .entry((action.module.clone(), action.action_type.clone()))
            .or_insert((0, String::new()));
        entry.0 += 1;
        if action.created_at > entry.1 {
            entry.1 = action.created_at.clone();
        }
    }

    // One dominant action per module; ties go to the alphabetically first
    // action type so reruns are stable.
    let mut dominant: HashMap<String, (String, u32, String)> = HashMap::new();
    for ((module, action_type), (count, last_occurrence)) in counts {
        match dominant.get(&module) {
            Some((best_type, best_count, _))
                if *best_count > count || (*best_count == count && *best_type < action_type) => {}
            _ => {
                dominant.insert(module, (action_type, count, last_occurrence));
            }
        }
    }

    let now = Utc::now().to_rfc3339();
    let mut written = 0;
    for (module, (action_type, count, last_occurrence)) in dominant {
        if count < policy.pattern_min_count {
            continue;
        }
        let payload = PatternData::FrequentAction {
            action_type,
            count,
            window: policy.pattern_window,
        };
        let pattern_data = serde_json::to_string(&payload)
            .map_err(|e| CoreError::Internal(format!("Could not encode pattern payload: {e}")))?;

        db.upsert_behavior_pattern(&DbBehaviorPattern {
            id: format!("bp-{}", Uuid::new_v4()),
            user_id: user_id.to_string(),
            module,
            pattern_type: PatternKind::FrequentAction.as_str().to_string(),
            pattern_data,
            frequency: count as i32,
            confidence: (f64::from(count) / FULL_CONFIDENCE_COUNT).min(1.0),
            last_occurrence,
            updated_at: now.clone(),
        })?;
        written += 1;
    }
    Ok(written)
}
