//! Action tracking: the durable write plus the analysis trigger.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::analytics::worker::{AnalysisPriority, AnalysisQueue};
use crate::db::{DbUserAction, FleetDb};
use crate::domain::Module;
use crate::error::CoreError;

/// User id recorded when the caller does not identify one.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Caller input for tracking a user action.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewUserAction {
    pub user_id: String,
    pub session_id: Option<String>,
    pub module: String,
    pub action_type: String,
    pub context: Option<serde_json::Value>,
    pub page_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Persist a user action and queue the user for background analysis.
///
/// The write is durable before this returns; the analysis itself runs
/// later on the worker and its outcome never affects this call.
pub fn track_action(
    db: &FleetDb,
    queue: &AnalysisQueue,
    input: NewUserAction,
) -> Result<DbUserAction, CoreError> {
    let module = Module::parse(&input.module)
        .ok_or_else(|| CoreError::validation(format!("Unknown module: '{}'", input.module)))?;

    let action_type = input.action_type.trim();
    if action_type.is_empty() {
        return Err(CoreError::validation("Action type must not be empty"));
    }

    let user_id = match input.user_id.trim() {
        "" => ANONYMOUS_USER.to_string(),
        id => id.to_string(),
    };

    let action = DbUserAction {
        id: format!("act-{}", Uuid::new_v4()),
        user_id,
        session_id: input.session_id,
        module: module.as_str().to_string(),
        action_type: action_type.to_string(),
        context: input.context.map(|v| v.to_string()),
        page_url: input.page_url,
        metadata: input.metadata.map(|v| v.to_string()),
        created_at: Utc::now().to_rfc3339(),
    };
    db.insert_user_action(&action)?;

    queue.enqueue(action.user_id.clone(), AnalysisPriority::ActionTracked);
    Ok(action)
}
