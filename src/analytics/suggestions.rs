//! Proactive suggestions derived from mined patterns.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::db::{DbSuggestion, DbUserAction, FleetDb};
use crate::domain::{PatternData, SuggestedAction, SuggestionKind, SuggestionPriority, SuggestionStatus};
use crate::error::CoreError;

/// Action type recorded when a user acts on a suggestion.
pub const SUGGESTION_ACTED_ACTION: &str = "suggestion_acted";

/// Turn heavily repeated patterns into optimization suggestions.
///
/// A pattern qualifies when its frequency is strictly above the policy
/// floor. A module with a live optimization suggestion for this user is
/// skipped, so dismissing or letting one expire is what re-opens the door.
/// Returns the number of suggestions created.
pub fn generate_suggestions(
    db: &FleetDb,
    policy: &PolicyConfig,
    user_id: &str,
) -> Result<usize, CoreError> {
    let patterns = db.get_frequent_patterns(user_id, policy.suggestion_min_frequency as i32)?;
    if patterns.is_empty() {
        return Ok(0);
    }

    let now = Utc::now();
    let mut created = 0;
    for pattern in patterns {
        if db.has_live_suggestion(user_id, &pattern.module, SuggestionKind::Optimization.as_str())? {
            continue;
        }

        let payload = match serde_json::from_str::<PatternData>(&pattern.pattern_data) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Skipping pattern {} with unreadable payload: {e}", pattern.id);
                continue;
            }
        };
        let action_type = match payload {
            PatternData::FrequentAction { action_type, .. } => action_type,
            _ => continue,
        };

        let suggested_action = serde_json::to_string(&SuggestedAction::AutomateAction {
            module: pattern.module.clone(),
            action_type: action_type.clone(),
        })
        .map_err(|e| CoreError::Internal(format!("Could not encode suggested action: {e}")))?;

        db.insert_suggestion(&DbSuggestion {
            id: format!("sug-{}", Uuid::new_v4()),
            user_id: user_id.to_string(),
            module: pattern.module.clone(),
            suggestion_type: SuggestionKind::Optimization.as_str().to_string(),
            priority: SuggestionPriority::Medium.as_str().to_string(),
            title: format!("Speed up {action_type} in {}", pattern.module),
            description: format!(
                "You have done {action_type} {} times recently in {}. A shortcut or saved preset could cut that down.",
                pattern.frequency, pattern.module
            ),
            suggested_action: Some(suggested_action),
            trigger_pattern_id: Some(pattern.id.clone()),
            status: SuggestionStatus::Active.as_str().to_string(),
            created_at: now.to_rfc3339(),
            expires_at: Some((now + Duration::days(policy.suggestion_ttl_days)).to_rfc3339()),
            dismissed_at: None,
            acted_at: None,
        })?;
        created += 1;
    }
    Ok(created)
}

/// The user's live suggestions, newest first.
pub fn active_suggestions(db: &FleetDb, user_id: &str) -> Result<Vec<DbSuggestion>, CoreError> {
    Ok(db.get_active_suggestions(user_id)?)
}

/// Dismiss a suggestion. Dismissing one that already left the active
/// state returns it unchanged.
pub fn dismiss_suggestion(
    db: &FleetDb,
    user_id: &str,
    suggestion_id: &str,
) -> Result<DbSuggestion, CoreError> {
    let existing = db
        .get_suggestion_for_user(user_id, suggestion_id)?
        .ok_or_else(|| CoreError::NotFound("suggestion", suggestion_id.to_string()))?;
    if existing.status != SuggestionStatus::Active.as_str() {
        return Ok(existing);
    }

    let now = Utc::now().to_rfc3339();
    db.mark_suggestion_dismissed(user_id, suggestion_id, &now)?;
    reread(db, user_id, suggestion_id)
}

/// Act on a suggestion: mark it acted upon and record a companion
/// `suggestion_acted` user action in the same transaction. Acting on one
/// that already left the active state returns it unchanged and records
/// nothing.
pub fn act_on_suggestion(
    db: &FleetDb,
    user_id: &str,
    suggestion_id: &str,
) -> Result<DbSuggestion, CoreError> {
    let existing = db
        .get_suggestion_for_user(user_id, suggestion_id)?
        .ok_or_else(|| CoreError::NotFound("suggestion", suggestion_id.to_string()))?;
    if existing.status != SuggestionStatus::Active.as_str() {
        return Ok(existing);
    }

    let now = Utc::now().to_rfc3339();
    db.with_transaction(|tx| {
        let transitioned = tx.mark_suggestion_acted(user_id, suggestion_id, &now)?;
        if transitioned {
            tx.insert_user_action(&DbUserAction {
                id: format!("act-{}", Uuid::new_v4()),
                user_id: user_id.to_string(),
                session_id: None,
                module: existing.module.clone(),
                action_type: SUGGESTION_ACTED_ACTION.to_string(),
                context: Some(
                    serde_json::json!({
                        "suggestionId": suggestion_id,
                        "suggestionType": existing.suggestion_type,
                    })
                    .to_string(),
                ),
                page_url: None,
                metadata: None,
                created_at: now.clone(),
            })?;
        }
        Ok(())
    })?;
    reread(db, user_id, suggestion_id)
}

fn reread(db: &FleetDb, user_id: &str, suggestion_id: &str) -> Result<DbSuggestion, CoreError> {
    db.get_suggestion_for_user(user_id, suggestion_id)?
        .ok_or_else(|| CoreError::Internal(format!("Suggestion {suggestion_id} vanished during update")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_db;
    use crate::db::DbBehaviorPattern;

    fn seed_pattern(db: &FleetDb, id: &str, module: &str, frequency: i32) {
        let now = Utc::now().to_rfc3339();
        let pattern_data = serde_json::to_string(&PatternData::FrequentAction {
            action_type: "log_task".to_string(),
            count: frequency as u32,
            window: 100,
        })
        .expect("encode");
        db.upsert_behavior_pattern(&DbBehaviorPattern {
            id: id.to_string(),
            user_id: "u1".to_string(),
            module: module.to_string(),
            pattern_type: "frequent_action".to_string(),
            pattern_data,
            frequency,
            confidence: 1.0,
            last_occurrence: now.clone(),
            updated_at: now,
        })
        .expect("seed pattern");
    }

    fn suggestion_acted_count(db: &FleetDb) -> usize {
        db.get_recent_actions("u1", 50)
            .expect("actions")
            .iter()
            .filter(|a| a.action_type == SUGGESTION_ACTED_ACTION)
            .count()
    }

    #[test]
    fn test_frequent_pattern_yields_suggestion() {
        let db = test_db();
        seed_pattern(&db, "bp-1", "maintenance", 12);

        let created = generate_suggestions(&db, &PolicyConfig::default(), "u1").expect("generate");
        assert_eq!(created, 1);

        let live = active_suggestions(&db, "u1").expect("active");
        assert_eq!(live.len(), 1);
        let suggestion = &live[0];
        assert!(suggestion.id.starts_with("sug-"));
        assert_eq!(suggestion.suggestion_type, "optimization");
        assert_eq!(suggestion.priority, "medium");
        assert_eq!(suggestion.module, "maintenance");
        assert!(suggestion.title.contains("log_task"));
        assert!(suggestion.description.contains("12 times"));
        assert_eq!(suggestion.trigger_pattern_id.as_deref(), Some("bp-1"));
        assert!(suggestion.expires_at.as_ref().expect("expiry") > &suggestion.created_at);

        let action: SuggestedAction =
            serde_json::from_str(suggestion.suggested_action.as_deref().expect("action"))
                .expect("parse");
        assert_eq!(
            action,
            SuggestedAction::AutomateAction {
                module: "maintenance".to_string(),
                action_type: "log_task".to_string(),
            }
        );
    }

    #[test]
    fn test_frequency_floor_is_strict() {
        let db = test_db();
        seed_pattern(&db, "bp-1", "maintenance", 10);

        let created = generate_suggestions(&db, &PolicyConfig::default(), "u1").expect("generate");
        assert_eq!(created, 0);
        assert!(active_suggestions(&db, "u1").expect("active").is_empty());
    }

    #[test]
    fn test_live_suggestion_blocks_duplicates() {
        let db = test_db();
        seed_pattern(&db, "bp-1", "maintenance", 12);
        let policy = PolicyConfig::default();

        assert_eq!(generate_suggestions(&db, &policy, "u1").expect("first"), 1);
        assert_eq!(generate_suggestions(&db, &policy, "u1").expect("second"), 0);
        assert_eq!(active_suggestions(&db, "u1").expect("active").len(), 1);
    }

    #[test]
    fn test_dismissal_reopens_generation() {
        let db = test_db();
        seed_pattern(&db, "bp-1", "maintenance", 12);
        let policy = PolicyConfig::default();

        generate_suggestions(&db, &policy, "u1").expect("first");
        let id = active_suggestions(&db, "u1").expect("active")[0].id.clone();
        dismiss_suggestion(&db, "u1", &id).expect("dismiss");

        assert_eq!(generate_suggestions(&db, &policy, "u1").expect("second"), 1);
        let live = active_suggestions(&db, "u1").expect("active");
        assert_eq!(live.len(), 1);
        assert_ne!(live[0].id, id);
    }

    #[test]
    fn test_expired_suggestion_reopens_generation() {
        let db = test_db();
        seed_pattern(&db, "bp-1", "maintenance", 12);
        let now = Utc::now();

        // An active suggestion whose expiry has already passed.
        db.insert_suggestion(&DbSuggestion {
            id: "sug-old".to_string(),
            user_id: "u1".to_string(),
            module: "maintenance".to_string(),
            suggestion_type: "optimization".to_string(),
            priority: "medium".to_string(),
            title: "Old".to_string(),
            description: "Old".to_string(),
            suggested_action: None,
            trigger_pattern_id: None,
            status: "active".to_string(),
            created_at: (now - Duration::days(10)).to_rfc3339(),
            expires_at: Some((now - Duration::days(3)).to_rfc3339()),
            dismissed_at: None,
            acted_at: None,
        })
        .expect("seed stale");

        let created = generate_suggestions(&db, &PolicyConfig::default(), "u1").expect("generate");
        assert_eq!(created, 1);

        let live = active_suggestions(&db, "u1").expect("active");
        assert_eq!(live.len(), 1);
        assert_ne!(live[0].id, "sug-old");
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let db = test_db();
        seed_pattern(&db, "bp-1", "maintenance", 12);
        generate_suggestions(&db, &PolicyConfig::default(), "u1").expect("generate");
        let id = active_suggestions(&db, "u1").expect("active")[0].id.clone();

        let first = dismiss_suggestion(&db, "u1", &id).expect("first");
        assert_eq!(first.status, "dismissed");
        let dismissed_at = first.dismissed_at.clone().expect("dismissed_at");

        let second = dismiss_suggestion(&db, "u1", &id).expect("second");
        assert_eq!(second.status, "dismissed");
        assert_eq!(second.dismissed_at.as_deref(), Some(dismissed_at.as_str()));
    }

    #[test]
    fn test_act_records_one_companion_action() {
        let db = test_db();
        seed_pattern(&db, "bp-1", "maintenance", 12);
        generate_suggestions(&db, &PolicyConfig::default(), "u1").expect("generate");
        let id = active_suggestions(&db, "u1").expect("active")[0].id.clone();

        let acted = act_on_suggestion(&db, "u1", &id).expect("act");
        assert_eq!(acted.status, "acted_upon");
        let acted_at = acted.acted_at.clone().expect("acted_at");
        assert_eq!(suggestion_acted_count(&db), 1);

        let again = act_on_suggestion(&db, "u1", &id).expect("act again");
        assert_eq!(again.acted_at.as_deref(), Some(acted_at.as_str()));
        assert_eq!(suggestion_acted_count(&db), 1);
    }

    #[test]
    fn test_act_after_dismiss_changes_nothing() {
        let db = test_db();
        seed_pattern(&db, "bp-1", "maintenance", 12);
        generate_suggestions(&db, &PolicyConfig::default(), "u1").expect("generate");
        let id = active_suggestions(&db, "u1").expect("active")[0].id.clone();

        dismiss_suggestion(&db, "u1", &id).expect("dismiss");
        let after = act_on_suggestion(&db, "u1", &id).expect("act");
        assert_eq!(after.status, "dismissed");
        assert!(after.acted_at.is_none());
        assert_eq!(suggestion_acted_count(&db), 0);
    }

    #[test]
    fn test_unknown_or_foreign_suggestion_is_not_found() {
        let db = test_db();
        seed_pattern(&db, "bp-1", "maintenance", 12);
        generate_suggestions(&db, &PolicyConfig::default(), "u1").expect("generate");
        let id = active_suggestions(&db, "u1").expect("active")[0].id.clone();

        let err = dismiss_suggestion(&db, "u1", "sug-ghost").unwrap_err();
        assert!(matches!(err, CoreError::NotFound("suggestion", _)));

        let err = act_on_suggestion(&db, "someone-else", &id).unwrap_err();
        assert!(matches!(err, CoreError::NotFound("suggestion", _)));
    }
}
