//! Write-back sync: push a job out into the other modules.
//!
//! Each step writes one record with a deterministic id derived from the job
//! id, so re-running a sync lands on the same rows instead of stacking
//! duplicates. Steps run in a fixed order, report individually, and never
//! roll each other back; a failed step leaves earlier steps in place.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PolicyConfig;
use crate::db::{
    DbComplianceRequirement, DbCrewAssignment, DbEquipment, DbFinanceTransaction, DbInventoryItem,
    DbJob, FleetDb,
};
use crate::domain::{Module, TransactionKind};
use crate::error::CoreError;

/// Days ahead the post-repair inspection is scheduled.
const MAINTENANCE_LEAD_DAYS: i64 = 30;

/// Which sync steps to run. Everything is on by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncOptions {
    pub sync_equipment: bool,
    pub update_inventory: bool,
    pub create_finance_records: bool,
    pub assign_crew: bool,
    pub schedule_maintenance: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            sync_equipment: true,
            update_inventory: true,
            create_finance_records: true,
            assign_crew: true,
            schedule_maintenance: true,
        }
    }
}

/// The sync steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStep {
    Equipment,
    Inventory,
    Finance,
    Crew,
    Maintenance,
}

impl SyncStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStep::Equipment => "equipment",
            SyncStep::Inventory => "inventory",
            SyncStep::Finance => "finance",
            SyncStep::Crew => "crew",
            SyncStep::Maintenance => "maintenance",
        }
    }
}

/// Outcome of one executed step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step: SyncStep,
    pub success: bool,
    pub message: String,
}

/// Outcome of a full integration run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationReport {
    pub job_id: String,
    pub success: bool,
    pub steps: Vec<StepReport>,
}

/// Run the enabled sync steps for a job, in order.
///
/// Disabled steps are skipped and do not appear in the report. A failing
/// step is reported and the run continues; `success` is true only when
/// every executed step succeeded.
pub fn perform_full_integration(
    db: &FleetDb,
    policy: &PolicyConfig,
    job_id: &str,
    options: &SyncOptions,
) -> Result<IntegrationReport, CoreError> {
    let job = db
        .get_job(job_id)?
        .ok_or_else(|| CoreError::NotFound("job", job_id.to_string()))?;

    let planned = [
        (SyncStep::Equipment, options.sync_equipment),
        (SyncStep::Inventory, options.update_inventory),
        (SyncStep::Finance, options.create_finance_records),
        (SyncStep::Crew, options.assign_crew),
        (SyncStep::Maintenance, options.schedule_maintenance),
    ];

    let mut steps = Vec::new();
    let mut success = true;

    for (step, enabled) in planned {
        if !enabled {
            continue;
        }
        let outcome = match step {
            SyncStep::Equipment => sync_equipment_step(db, &job),
            SyncStep::Inventory => update_inventory_step(db, &job),
            SyncStep::Finance => create_finance_step(db, policy, &job),
            SyncStep::Crew => assign_crew_step(db, &job),
            SyncStep::Maintenance => schedule_maintenance_step(db, &job),
        };
        match outcome {
            Ok(message) => steps.push(StepReport {
                step,
                success: true,
                message,
            }),
            Err(message) => {
                log::warn!(
                    "Integration step {} failed for job {}: {message}",
                    step.as_str(),
                    job.id
                );
                success = false;
                steps.push(StepReport {
                    step,
                    success: false,
                    message,
                });
            }
        }
    }

    Ok(IntegrationReport {
        job_id: job.id,
        success,
        steps,
    })
}

fn sync_equipment_step(db: &FleetDb, job: &DbJob) -> Result<String, String> {
    let equipment = DbEquipment {
        id: format!("eq-sync-{}", job.id),
        name: format!("{} service equipment", job.name),
        category: Some("service".to_string()),
        status: "in_service".to_string(),
        job_id: Some(job.id.clone()),
        next_maintenance_date: None,
        updated_at: Utc::now().to_rfc3339(),
    };
    db.upsert_equipment(&equipment).map_err(|e| e.to_string())?;
    Ok(format!("Linked service equipment to {}", job.name))
}

fn update_inventory_step(db: &FleetDb, job: &DbJob) -> Result<String, String> {
    let item = DbInventoryItem {
        id: format!("inv-sync-{}", job.id),
        name: format!("Reserved parts for {}", job.name),
        quantity: 1.0,
        min_stock: None,
        unit: Some("lot".to_string()),
        job_id: Some(job.id.clone()),
        updated_at: Utc::now().to_rfc3339(),
    };
    db.upsert_inventory_item(&item).map_err(|e| e.to_string())?;
    Ok(format!("Reserved a parts lot for {}", job.name))
}

fn create_finance_step(db: &FleetDb, policy: &PolicyConfig, job: &DbJob) -> Result<String, String> {
    let amount = job
        .estimated_cost
        .filter(|v| *v > 0.0)
        .or(job.actual_cost.filter(|v| *v > 0.0))
        .ok_or_else(|| format!("Job {} has no positive cost figure to book", job.id))?;

    let transaction = DbFinanceTransaction {
        id: format!("fin-sync-{}", job.id),
        job_id: Some(job.id.clone()),
        source_module: Module::Claims.as_str().to_string(),
        kind: TransactionKind::Expense.as_str().to_string(),
        amount,
        currency: policy.default_currency.clone(),
        description: Some(format!("Projected cost for {}", job.name)),
        created_at: Utc::now().to_rfc3339(),
    };
    db.upsert_finance_transaction(&transaction)
        .map_err(|e| e.to_string())?;
    Ok(format!(
        "Booked {amount:.2} {} against {}",
        transaction.currency, job.name
    ))
}

fn assign_crew_step(db: &FleetDb, job: &DbJob) -> Result<String, String> {
    let assignment = DbCrewAssignment {
        id: format!("crew-sync-{}", job.id),
        job_id: job.id.clone(),
        member_name: "Duty engineer".to_string(),
        role: "maintenance".to_string(),
        assigned_at: Utc::now().to_rfc3339(),
    };
    db.upsert_crew_assignment(&assignment)
        .map_err(|e| e.to_string())?;
    Ok(format!("Assigned a duty engineer to {}", job.name))
}

fn schedule_maintenance_step(db: &FleetDb, job: &DbJob) -> Result<String, String> {
    let due = (Utc::now().date_naive() + Duration::days(MAINTENANCE_LEAD_DAYS))
        .format("%Y-%m-%d")
        .to_string();
    let requirement = DbComplianceRequirement {
        id: format!("maint-sync-{}", job.id),
        title: format!("Post-repair inspection for {}", job.name),
        severity: "medium".to_string(),
        status: "open".to_string(),
        due_date: Some(due.clone()),
        job_id: Some(job.id.clone()),
        equipment_id: None,
        updated_at: Utc::now().to_rfc3339(),
    };
    db.upsert_compliance_requirement(&requirement)
        .map_err(|e| e.to_string())?;
    Ok(format!("Scheduled a post-repair inspection for {due}"))
}

// =============================================================================
// Finance transaction creation
// =============================================================================

/// Caller input for booking a finance transaction against a job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFinanceTransaction {
    pub job_id: String,
    pub kind: String,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source_module: Option<String>,
}

/// Validate and book a finance transaction.
///
/// The amount must be a positive finite number, the kind one of the known
/// transaction kinds, and the currency a 3-letter code (normalized to upper
/// case). The job must exist.
pub fn create_finance_transaction(
    db: &FleetDb,
    input: NewFinanceTransaction,
) -> Result<DbFinanceTransaction, CoreError> {
    let kind = TransactionKind::parse(&input.kind).ok_or_else(|| {
        CoreError::validation(format!(
            "Transaction kind must be expense or invoice, got '{}'",
            input.kind
        ))
    })?;

    if !(input.amount.is_finite() && input.amount > 0.0) {
        return Err(CoreError::validation(
            "Transaction amount must be greater than zero",
        ));
    }

    let currency = input.currency.trim().to_ascii_uppercase();
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(CoreError::validation(format!(
            "Currency must be a 3-letter code, got '{}'",
            input.currency
        )));
    }

    let source_module = match &input.source_module {
        None => Module::Finance,
        Some(s) => Module::parse(s)
            .ok_or_else(|| CoreError::validation(format!("Unknown module: {s}")))?,
    };

    if db.get_job(&input.job_id)?.is_none() {
        return Err(CoreError::NotFound("job", input.job_id));
    }

    let transaction = DbFinanceTransaction {
        id: format!("fin-{}", Uuid::new_v4()),
        job_id: Some(input.job_id),
        source_module: source_module.as_str().to_string(),
        kind: kind.as_str().to_string(),
        amount: input.amount,
        currency,
        description: input.description,
        created_at: Utc::now().to_rfc3339(),
    };
    db.insert_finance_transaction(&transaction)?;
    Ok(transaction)
}
