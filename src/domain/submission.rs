use crate::core::dip::{CalibrationTable, DipMeasurement};
use crate::core::sale::SalesSummary;
use crate::core::shift::{ShiftPlan, ShiftReport};
use crate::domain::model::{Reading, SaleComputation, ValidationResult};
use crate::domain::session::Permission;
use crate::utils::error::{AuditError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleEntry {
    pub nozzle_id: String,
    pub unit_price: Decimal,
    pub mechanical: Reading,
    pub electronic: Reading,
}

/// 表單送出的資料，以 `kind` 區分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Submission {
    TankCheck {
        tank_id: String,
        #[serde(default)]
        readings: Vec<Reading>,
        #[serde(default)]
        dip: Option<DipMeasurement>,
        #[serde(default)]
        calibration: Option<CalibrationTable>,
    },
    Sale(SaleEntry),
    SalesBatch {
        sales: Vec<SaleEntry>,
    },
    Shift(ShiftPlan),
}

impl Submission {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let submission: Submission = serde_json::from_slice(bytes)?;
        submission.check()?;
        Ok(submission)
    }

    pub fn required_permission(&self) -> Permission {
        match self {
            Submission::TankCheck { .. } | Submission::Sale(_) | Submission::SalesBatch { .. } => {
                Permission::RecordReadings
            }
            Submission::Shift(_) => Permission::CreateShift,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Submission::TankCheck { .. } => "tank_check",
            Submission::Sale(_) => "sale",
            Submission::SalesBatch { .. } => "sales_batch",
            Submission::Shift(_) => "shift",
        }
    }

    /// Boundary checks on decoded payloads: every reading is re-validated
    /// and a dip needs a calibration table.
    pub fn check(&self) -> Result<()> {
        match self {
            Submission::TankCheck {
                readings,
                dip,
                calibration,
                ..
            } => {
                for reading in readings {
                    reading.validate()?;
                }
                if dip.is_some() && calibration.is_none() {
                    return Err(AuditError::MissingConfigError {
                        field: "calibration".to_string(),
                    });
                }
                Ok(())
            }
            Submission::Sale(entry) => entry.check(),
            Submission::SalesBatch { sales } => sales.iter().try_for_each(SaleEntry::check),
            Submission::Shift(_) => Ok(()),
        }
    }
}

impl SaleEntry {
    fn check(&self) -> Result<()> {
        self.mechanical.validate()?;
        self.electronic.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditOutcome {
    TankCheck {
        tank_id: String,
        result: ValidationResult,
    },
    Sale {
        sale: SaleComputation,
    },
    SalesBatch {
        sales: Vec<SaleComputation>,
        summary: SalesSummary,
    },
    Shift {
        report: ShiftReport,
    },
}

impl AuditOutcome {
    pub fn sales(&self) -> &[SaleComputation] {
        match self {
            AuditOutcome::Sale { sale } => std::slice::from_ref(sale),
            AuditOutcome::SalesBatch { sales, .. } => sales,
            AuditOutcome::TankCheck { .. } | AuditOutcome::Shift { .. } => &[],
        }
    }
}
