//! Rule-based insights over the integrated job view.
//!
//! Four buckets, each fed by one rule family. All rules are pure over the
//! already-assembled [`IntegratedJobView`] so they stay cheap to test.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::PolicyConfig;
use crate::db::FleetDb;
use crate::error::CoreError;
use crate::integration::{integrated_job_view, IntegratedJobView};

/// Insight messages for one job, grouped by theme.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInsights {
    pub cost_optimization: Vec<String>,
    pub preventive_maintenance: Vec<String>,
    pub compliance_alerts: Vec<String>,
    pub resource_recommendations: Vec<String>,
}

/// Generate insights for a job from its current related records.
pub fn generate_insights(
    db: &FleetDb,
    policy: &PolicyConfig,
    job_id: &str,
) -> Result<JobInsights, CoreError> {
    let view = integrated_job_view(db, job_id)?;
    let tz: chrono_tz::Tz = policy.timezone.parse().unwrap_or(chrono_tz::UTC);
    let today = chrono::Utc::now().with_timezone(&tz).date_naive();
    Ok(derive_insights(&view, policy, today))
}

fn derive_insights(view: &IntegratedJobView, policy: &PolicyConfig, today: NaiveDate) -> JobInsights {
    let today_str = today.format("%Y-%m-%d").to_string();
    let mut insights = JobInsights::default();

    // Cost: recorded expenses against the estimate, with the overrun margin.
    if let Some(estimate) = view.job.estimated_cost.filter(|v| *v > 0.0) {
        let spent: f64 = view
            .finance_transactions
            .iter()
            .filter(|tx| tx.kind == "expense")
            .map(|tx| tx.amount)
            .sum();
        if spent > estimate * policy.cost_overrun_ratio {
            insights.cost_optimization.push(format!(
                "Expenses of {spent:.2} exceed the {estimate:.2} estimate for {}; review open spend before booking more work",
                view.job.name
            ));
        }
    }

    // Preventive maintenance: equipment with no forward service anywhere.
    for equipment in &view.related_equipment {
        let service_booked = equipment
            .next_maintenance_date
            .as_deref()
            .is_some_and(|date| date >= today_str.as_str());
        let survey_booked = view.compliance_requirements.iter().any(|req| {
            req.equipment_id.as_deref() == Some(equipment.id.as_str())
                && req.due_date.as_deref().is_some_and(|d| d >= today_str.as_str())
        });
        if !service_booked && !survey_booked {
            insights.preventive_maintenance.push(format!(
                "No upcoming service is booked for {}; schedule preventive maintenance",
                equipment.name
            ));
        }
    }

    // Compliance: critical first, otherwise overdue. One alert per requirement.
    for req in &view.compliance_requirements {
        if req.severity == "critical" {
            insights
                .compliance_alerts
                .push(format!("Critical requirement open: {}", req.title));
        } else if req
            .due_date
            .as_deref()
            .is_some_and(|d| d < today_str.as_str())
        {
            insights.compliance_alerts.push(format!(
                "{} was due {} and is overdue",
                req.title,
                req.due_date.as_deref().unwrap_or("")
            ));
        }
    }

    // Resources: items under their restock level.
    for item in &view.related_inventory {
        let floor = item.min_stock.unwrap_or(policy.min_stock_fallback);
        if item.quantity < floor {
            let unit = item.unit.as_deref().unwrap_or("units");
            insights.resource_recommendations.push(format!(
                "{} is below its restock level ({} {unit} on hand, needs {floor}); reorder before the next job",
                item.name, item.quantity
            ));
        }
    }

    insights
}
