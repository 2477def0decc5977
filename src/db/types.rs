//! Shared type definitions for the database layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Failed to create database directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

/// A row from the `jobs` table. A job is one unit of fleet work, e.g. a
/// repair ticket or a scheduled service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbJob {
    pub id: String,
    pub name: String,
    pub status: String,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `equipment` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbEquipment {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub status: String,
    pub job_id: Option<String>,
    /// Next planned service date (`YYYY-MM-DD`), if one is booked.
    pub next_maintenance_date: Option<String>,
    pub updated_at: String,
}

/// A row from the `inventory_items` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    /// Item-specific restock threshold; policy fallback applies when unset.
    pub min_stock: Option<f64>,
    pub unit: Option<String>,
    pub job_id: Option<String>,
    pub updated_at: String,
}

/// A row from the `crew_assignments` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbCrewAssignment {
    pub id: String,
    pub job_id: String,
    pub member_name: String,
    pub role: String,
    pub assigned_at: String,
}

/// A row from the `finance_transactions` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbFinanceTransaction {
    pub id: String,
    pub job_id: Option<String>,
    /// Module that booked the transaction.
    pub source_module: String,
    /// "expense" or "invoice".
    pub kind: String,
    pub amount: f64,
    pub currency: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// A row from the `compliance_requirements` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbComplianceRequirement {
    pub id: String,
    pub title: String,
    pub severity: String,
    pub status: String,
    /// Deadline (`YYYY-MM-DD`), if one applies.
    pub due_date: Option<String>,
    pub job_id: Option<String>,
    pub equipment_id: Option<String>,
    pub updated_at: String,
}

/// A row from the `user_actions` table. One captured UI interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbUserAction {
    pub id: String,
    pub user_id: String,
    pub session_id: Option<String>,
    pub module: String,
    pub action_type: String,
    /// JSON blob describing what the action touched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub page_url: Option<String>,
    /// JSON blob with client details (viewport, build, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub created_at: String,
}

/// A row from the `behavior_patterns` table. One mined pattern per
/// (user, module, pattern kind).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbBehaviorPattern {
    pub id: String,
    pub user_id: String,
    pub module: String,
    pub pattern_type: String,
    /// Tagged JSON payload, see `domain::PatternData`.
    pub pattern_data: String,
    pub frequency: i32,
    pub confidence: f64,
    pub last_occurrence: String,
    pub updated_at: String,
}

/// A row from the `suggestions` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbSuggestion {
    pub id: String,
    pub user_id: String,
    pub module: String,
    pub suggestion_type: String,
    pub priority: String,
    pub title: String,
    pub description: String,
    /// Tagged JSON payload, see `domain::SuggestedAction`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Pattern that triggered this suggestion, when one did.
    pub trigger_pattern_id: Option<String>,
    pub status: String,
    pub created_at: String,
    pub expires_at: Option<String>,
    pub dismissed_at: Option<String>,
    pub acted_at: Option<String>,
}
