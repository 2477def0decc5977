//! Cross-module view of a single job.
//!
//! A job touches records in five other modules: equipment, inventory, crew,
//! finance, and compliance. This module assembles the combined view, scores
//! how completely the job is wired up, and derives insights and write-back
//! sync on top of it.

use serde::Serialize;

use crate::db::{
    DbComplianceRequirement, DbCrewAssignment, DbEquipment, DbError, DbFinanceTransaction,
    DbInventoryItem, DbJob, FleetDb,
};
use crate::error::CoreError;

pub mod insights;
pub mod sync;

pub use insights::{generate_insights, JobInsights};
pub use sync::{
    create_finance_transaction, perform_full_integration, IntegrationReport,
    NewFinanceTransaction, StepReport, SyncOptions, SyncStep,
};

// Health score penalties per missing record class.
const MISSING_EQUIPMENT_PENALTY: u32 = 20;
const MISSING_INVENTORY_PENALTY: u32 = 15;
const MISSING_CREW_PENALTY: u32 = 15;
const MISSING_FINANCE_PENALTY: u32 = 20;
const MISSING_COMPLIANCE_PENALTY: u32 = 10;

/// A job with every related record class attached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegratedJobView {
    pub job: DbJob,
    pub related_equipment: Vec<DbEquipment>,
    pub related_inventory: Vec<DbInventoryItem>,
    pub finance_transactions: Vec<DbFinanceTransaction>,
    pub compliance_requirements: Vec<DbComplianceRequirement>,
    pub crew: Vec<DbCrewAssignment>,
    pub health_score: u8,
}

/// Assemble the integrated view for one job.
///
/// The job itself must exist; each related class degrades to an empty list
/// on a read failure so one broken relation does not sink the whole view.
pub fn integrated_job_view(db: &FleetDb, job_id: &str) -> Result<IntegratedJobView, CoreError> {
    let job = db
        .get_job(job_id)?
        .ok_or_else(|| CoreError::NotFound("job", job_id.to_string()))?;

    let related_equipment = load_or_empty(job_id, "equipment", db.get_equipment_for_job(job_id));
    let related_inventory = load_or_empty(job_id, "inventory", db.get_inventory_for_job(job_id));
    let finance_transactions = load_or_empty(job_id, "finance", db.get_finance_for_job(job_id));
    let compliance_requirements =
        load_or_empty(job_id, "compliance", db.get_compliance_for_job(job_id));
    let crew = load_or_empty(job_id, "crew", db.get_crew_for_job(job_id));

    let health_score = health_score(
        related_equipment.len(),
        related_inventory.len(),
        crew.len(),
        finance_transactions.len(),
        compliance_requirements.len(),
    );

    Ok(IntegratedJobView {
        job,
        related_equipment,
        related_inventory,
        finance_transactions,
        compliance_requirements,
        crew,
        health_score,
    })
}

fn load_or_empty<T>(job_id: &str, relation: &str, result: Result<Vec<T>, DbError>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            log::warn!("Could not load {relation} for job {job_id}: {e}");
            Vec::new()
        }
    }
}

/// Integration health of a job, from the row counts of its related classes.
///
/// Starts at 100 and deducts a fixed penalty per empty class. A job with no
/// related records at all scores 0: nothing is integrated.
pub fn health_score(
    equipment: usize,
    inventory: usize,
    crew: usize,
    finance: usize,
    compliance: usize,
) -> u8 {
    if equipment == 0 && inventory == 0 && crew == 0 && finance == 0 && compliance == 0 {
        return 0;
    }

    let mut penalty = 0u32;
    if equipment == 0 {
        penalty += MISSING_EQUIPMENT_PENALTY;
    }
    if inventory == 0 {
        penalty += MISSING_INVENTORY_PENALTY;
    }
    if crew == 0 {
        penalty += MISSING_CREW_PENALTY;
    }
    if finance == 0 {
        penalty += MISSING_FINANCE_PENALTY;
    }
    if compliance == 0 {
        penalty += MISSING_COMPLIANCE_PENALTY;
    }

    100u32.saturating_sub(penalty) as u8
}
