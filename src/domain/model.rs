use crate::utils::error::{AuditError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Mechanical,
    Electronic,
    Dip,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Mechanical => write!(f, "mechanical"),
            SourceType::Electronic => write!(f, "electronic"),
            SourceType::Dip => write!(f, "dip"),
        }
    }
}

/// Largest value a meter or dip reading may carry.
pub const MAX_METER_VALUE: Decimal = dec!(1000000000000);

/// 一組開班/交班讀數，體積 = closing - opening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub source_type: SourceType,
    pub opening_value: Decimal,
    pub closing_value: Decimal,
}

impl Reading {
    pub fn new(source_type: SourceType, opening_value: Decimal, closing_value: Decimal) -> Result<Self> {
        let reading = Self {
            source_type,
            opening_value,
            closing_value,
        };
        reading.validate()?;
        Ok(reading)
    }

    pub fn mechanical(opening_value: Decimal, closing_value: Decimal) -> Result<Self> {
        Self::new(SourceType::Mechanical, opening_value, closing_value)
    }

    pub fn electronic(opening_value: Decimal, closing_value: Decimal) -> Result<Self> {
        Self::new(SourceType::Electronic, opening_value, closing_value)
    }

    /// 反序列化後的讀數需要重新檢查，不做任何修正
    pub fn validate(&self) -> Result<()> {
        if self.opening_value < Decimal::ZERO || self.closing_value < Decimal::ZERO {
            return Err(self.invalid("meter values cannot be negative"));
        }
        if self.opening_value > MAX_METER_VALUE || self.closing_value > MAX_METER_VALUE {
            return Err(self.invalid("meter value is out of range"));
        }
        if self.closing_value < self.opening_value {
            return Err(self.invalid("closing value is lower than opening value"));
        }
        Ok(())
    }

    pub fn volume(&self) -> Decimal {
        self.closing_value - self.opening_value
    }

    fn invalid(&self, reason: &str) -> AuditError {
        AuditError::InvalidReading {
            source_type: self.source_type,
            opening: self.opening_value,
            closing: self.closing_value,
            reason: reason.to_string(),
        }
    }
}

/// Percent thresholds for the three-tier tank/nozzle cross-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationThresholds {
    pub pass_threshold: Decimal,
    pub warning_threshold: Decimal,
}

impl ValidationThresholds {
    pub fn new(pass_threshold: Decimal, warning_threshold: Decimal) -> Result<Self> {
        let thresholds = Self {
            pass_threshold,
            warning_threshold,
        };
        thresholds.check()?;
        Ok(thresholds)
    }

    pub fn check(&self) -> Result<()> {
        if self.pass_threshold < Decimal::ZERO {
            return Err(AuditError::InvalidConfigValueError {
                field: "thresholds.pass_threshold".to_string(),
                value: self.pass_threshold.to_string(),
                reason: "Threshold cannot be negative".to_string(),
            });
        }
        if self.warning_threshold < self.pass_threshold {
            return Err(AuditError::InvalidConfigValueError {
                field: "thresholds.warning_threshold".to_string(),
                value: self.warning_threshold.to_string(),
                reason: format!(
                    "Warning threshold must be at least the pass threshold ({})",
                    self.pass_threshold
                ),
            });
        }
        Ok(())
    }

    pub fn classify(&self, discrepancy_percent: Decimal) -> ValidationStatus {
        if discrepancy_percent <= self.pass_threshold {
            ValidationStatus::Pass
        } else if discrepancy_percent <= self.warning_threshold {
            ValidationStatus::Warning
        } else {
            ValidationStatus::Fail
        }
    }
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            pass_threshold: dec!(0.5),
            warning_threshold: dec!(1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Pass,
    Warning,
    Fail,
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationStatus::Pass => write!(f, "PASS"),
            ValidationStatus::Warning => write!(f, "WARNING"),
            ValidationStatus::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairDiscrepancy {
    pub first: SourceType,
    pub second: SourceType,
    pub first_volume: Decimal,
    pub second_volume: Decimal,
    pub discrepancy_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub max_discrepancy_percent: Decimal,
    pub status: ValidationStatus,
    pub per_pair_discrepancies: Vec<PairDiscrepancy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    Pass,
    Fail,
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleStatus::Pass => write!(f, "PASS"),
            SaleStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// Single combined meter tolerance used for sales, separate from the
/// three-tier thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleTolerance {
    pub percent: Decimal,
}

impl SaleTolerance {
    pub fn new(percent: Decimal) -> Result<Self> {
        if percent < Decimal::ZERO {
            return Err(AuditError::InvalidConfigValueError {
                field: "sales.tolerance_percent".to_string(),
                value: percent.to_string(),
                reason: "Tolerance cannot be negative".to_string(),
            });
        }
        Ok(Self { percent })
    }

    pub fn classify(&self, discrepancy_percent: Decimal) -> SaleStatus {
        if discrepancy_percent <= self.percent {
            SaleStatus::Pass
        } else {
            SaleStatus::Fail
        }
    }
}

impl Default for SaleTolerance {
    fn default() -> Self {
        Self { percent: dec!(0.03) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleComputation {
    pub nozzle_id: String,
    pub mechanical_volume: Decimal,
    pub electronic_volume: Decimal,
    pub average_volume: Decimal,
    pub discrepancy_percent: Decimal,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub validation_status: SaleStatus,
}

/// 設定服務提供的數值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StationSettings {
    pub thresholds: ValidationThresholds,
    pub sale_tolerance: SaleTolerance,
}
