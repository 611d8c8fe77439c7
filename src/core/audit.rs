use crate::core::discrepancy::DiscrepancySet;
use crate::core::sale::{compute_sale, SalesSummary};
use crate::core::shift::validate_shift;
use crate::domain::model::{SaleComputation, StationSettings};
use crate::domain::session::SessionContext;
use crate::domain::submission::{AuditOutcome, SaleEntry, Submission};
use crate::utils::error::{AuditError, Result};
use chrono::NaiveDate;

/// Per-request options coming from the form handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationOptions {
    pub today: NaiveDate,
    pub confirm_warnings: bool,
}

/// 權限檢查後交給對應的計算
pub fn evaluate(
    session: &SessionContext,
    submission: &Submission,
    settings: &StationSettings,
    options: EvaluationOptions,
) -> Result<AuditOutcome> {
    session.authorize(submission.required_permission())?;
    settings.thresholds.check()?;

    match submission {
        Submission::TankCheck {
            tank_id,
            readings,
            dip,
            calibration,
        } => {
            let mut all = readings.clone();
            if let Some(dip) = dip {
                let table = calibration.as_ref().ok_or_else(|| AuditError::MissingConfigError {
                    field: "calibration".to_string(),
                })?;
                all.push(dip.to_reading(table)?);
            }
            let result = DiscrepancySet::new(all)?.validate(&settings.thresholds)?;
            tracing::info!(
                "⛽ Tank {}: max discrepancy {}% -> {}",
                tank_id,
                result.max_discrepancy_percent,
                result.status
            );
            Ok(AuditOutcome::TankCheck {
                tank_id: tank_id.clone(),
                result,
            })
        }
        Submission::Sale(entry) => {
            let sale = price_entry(entry, settings)?;
            Ok(AuditOutcome::Sale { sale })
        }
        Submission::SalesBatch { sales } => {
            let sales = sales
                .iter()
                .map(|entry| price_entry(entry, settings))
                .collect::<Result<Vec<_>>>()?;
            let summary = SalesSummary::from_sales(&sales)?;
            tracing::info!(
                "💰 {} nozzle(s): {} L, total {} ({} failing)",
                summary.nozzle_count,
                summary.total_volume,
                summary.total_amount,
                summary.failing_nozzles.len()
            );
            Ok(AuditOutcome::SalesBatch { sales, summary })
        }
        Submission::Shift(plan) => {
            let report = validate_shift(plan, options.today);
            for message in &report.messages {
                tracing::info!("{}", message);
            }
            report.gate(options.confirm_warnings)?;
            Ok(AuditOutcome::Shift { report })
        }
    }
}

fn price_entry(entry: &SaleEntry, settings: &StationSettings) -> Result<SaleComputation> {
    compute_sale(
        &entry.nozzle_id,
        &entry.mechanical,
        &entry.electronic,
        entry.unit_price,
        &settings.sale_tolerance,
    )
}
