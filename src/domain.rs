//! Shared vocabulary for the fleet domain.
//!
//! String-backed enums for the values stored in SQLite TEXT columns, plus
//! the typed JSON payloads carried by behavior patterns and suggestions.
//! Rows keep their wire form (plain strings); services parse into these
//! types at the boundary.

use serde::{Deserialize, Serialize};

/// Functional area of the application a record or user action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Maintenance,
    Inventory,
    Crew,
    Finance,
    Procurement,
    Compliance,
    Claims,
}

impl Module {
    /// Every module, in reporting order.
    pub const ALL: [Module; 7] = [
        Module::Maintenance,
        Module::Inventory,
        Module::Crew,
        Module::Finance,
        Module::Procurement,
        Module::Compliance,
        Module::Claims,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Maintenance => "maintenance",
            Module::Inventory => "inventory",
            Module::Crew => "crew",
            Module::Finance => "finance",
            Module::Procurement => "procurement",
            Module::Compliance => "compliance",
            Module::Claims => "claims",
        }
    }

    /// Parse a module name, rejecting anything outside the known set.
    pub fn parse(s: &str) -> Option<Module> {
        match s {
            "maintenance" => Some(Module::Maintenance),
            "inventory" => Some(Module::Inventory),
            "crew" => Some(Module::Crew),
            "finance" => Some(Module::Finance),
            "procurement" => Some(Module::Procurement),
            "compliance" => Some(Module::Compliance),
            "claims" => Some(Module::Claims),
            _ => None,
        }
    }
}

/// Kind of behavior pattern mined from a user's action history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    FrequentAction,
    WorkflowSequence,
    TimeBased,
    ContextSwitch,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::FrequentAction => "frequent_action",
            PatternKind::WorkflowSequence => "workflow_sequence",
            PatternKind::TimeBased => "time_based",
            PatternKind::ContextSwitch => "context_switch",
        }
    }
}

/// Kind of proactive suggestion surfaced to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Action,
    Workflow,
    Optimization,
    Alert,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Action => "action",
            SuggestionKind::Workflow => "workflow",
            SuggestionKind::Optimization => "optimization",
            SuggestionKind::Alert => "alert",
        }
    }
}

/// Display priority of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl SuggestionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionPriority::Low => "low",
            SuggestionPriority::Medium => "medium",
            SuggestionPriority::High => "high",
            SuggestionPriority::Critical => "critical",
        }
    }
}

/// Lifecycle state of a suggestion. `Dismissed` and `ActedUpon` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Active,
    Dismissed,
    ActedUpon,
}

impl SuggestionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Active => "active",
            SuggestionStatus::Dismissed => "dismissed",
            SuggestionStatus::ActedUpon => "acted_upon",
        }
    }
}

/// Direction of money on a finance transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Invoice,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Invoice => "invoice",
        }
    }

    pub fn parse(s: &str) -> Option<TransactionKind> {
        match s {
            "expense" => Some(TransactionKind::Expense),
            "invoice" => Some(TransactionKind::Invoice),
            _ => None,
        }
    }
}

/// Severity of a compliance requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Typed payload stored as JSON in `behavior_patterns.pattern_data`.
///
/// Tagged by `kind` so each pattern kind carries its own fields and stored
/// payloads stay readable after new kinds are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternData {
    FrequentAction {
        action_type: String,
        count: u32,
        window: u32,
    },
    WorkflowSequence {
        steps: Vec<String>,
    },
    TimeBased {
        hour_of_day: u8,
        count: u32,
    },
    ContextSwitch {
        from_module: String,
        to_module: String,
        count: u32,
    },
}

/// Typed payload stored as JSON in `suggestions.suggested_action`, telling
/// the client what acting on the suggestion should do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestedAction {
    AutomateAction {
        module: String,
        action_type: String,
    },
    OpenModule {
        module: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_parse_round_trip() {
        for module in Module::ALL {
            assert_eq!(Module::parse(module.as_str()), Some(module));
        }
    }

    #[test]
    fn test_module_parse_rejects_unknown() {
        assert_eq!(Module::parse("navigation"), None);
        assert_eq!(Module::parse(""), None);
        assert_eq!(Module::parse("Maintenance"), None);
    }

    #[test]
    fn test_transaction_kind_parse() {
        assert_eq!(TransactionKind::parse("expense"), Some(TransactionKind::Expense));
        assert_eq!(TransactionKind::parse("invoice"), Some(TransactionKind::Invoice));
        assert_eq!(TransactionKind::parse("refund"), None);
    }

    #[test]
    fn test_pattern_data_json_is_tagged() {
        let data = PatternData::FrequentAction {
            action_type: "log_task".to_string(),
            count: 12,
            window: 100,
        };
        let json = serde_json::to_value(&data).expect("serialize");
        assert_eq!(json["kind"], "frequent_action");
        assert_eq!(json["action_type"], "log_task");
        assert_eq!(json["count"], 12);

        let back: PatternData = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, data);
    }

    #[test]
    fn test_pattern_data_all_kinds_round_trip() {
        let samples = [
            PatternData::WorkflowSequence {
                steps: vec!["open_job".to_string(), "log_task".to_string()],
            },
            PatternData::TimeBased { hour_of_day: 9, count: 4 },
            PatternData::ContextSwitch {
                from_module: "maintenance".to_string(),
                to_module: "inventory".to_string(),
                count: 6,
            },
        ];
        for sample in samples {
            let json = serde_json::to_string(&sample).expect("serialize");
            let back: PatternData = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, sample);
        }
    }

    #[test]
    fn test_suggested_action_round_trip() {
        let action = SuggestedAction::AutomateAction {
            module: "maintenance".to_string(),
            action_type: "log_task".to_string(),
        };
        let json = serde_json::to_string(&action).expect("serialize");
        assert!(json.contains("\"kind\":\"automate_action\""));
        let back: SuggestedAction = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, action);
    }
}
