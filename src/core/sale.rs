use crate::core::discrepancy::discrepancy_percent;
use crate::domain::model::{Reading, SaleComputation, SaleStatus, SaleTolerance, SourceType};
use crate::utils::error::{AuditError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const AMOUNT_DP: u32 = 2;

/// 以機械與電子錶平均體積計價
pub fn compute_sale(
    nozzle_id: &str,
    mechanical: &Reading,
    electronic: &Reading,
    unit_price: Decimal,
    tolerance: &SaleTolerance,
) -> Result<SaleComputation> {
    expect_source(mechanical, SourceType::Mechanical)?;
    expect_source(electronic, SourceType::Electronic)?;
    mechanical.validate()?;
    electronic.validate()?;
    if unit_price < Decimal::ZERO {
        return Err(AuditError::InvalidPrice {
            price: unit_price,
            reason: "unit price cannot be negative".to_string(),
        });
    }

    let mechanical_volume = mechanical.volume();
    let electronic_volume = electronic.volume();
    let average_volume = mechanical_volume
        .checked_add(electronic_volume)
        .ok_or_else(|| AuditError::out_of_range("average volume"))?
        / dec!(2);
    let discrepancy_percent = discrepancy_percent(mechanical_volume, electronic_volume)?;
    let total_amount = average_volume
        .checked_mul(unit_price)
        .ok_or_else(|| AuditError::InvalidPrice {
            price: unit_price,
            reason: format!("total for {} L is out of range", average_volume),
        })?
        .round_dp_with_strategy(AMOUNT_DP, RoundingStrategy::MidpointAwayFromZero);
    let validation_status = tolerance.classify(discrepancy_percent);

    if validation_status == SaleStatus::Fail {
        tracing::warn!(
            "⚠️ Nozzle {}: meter discrepancy {}% exceeds tolerance {}%",
            nozzle_id,
            discrepancy_percent,
            tolerance.percent
        );
    }

    Ok(SaleComputation {
        nozzle_id: nozzle_id.to_string(),
        mechanical_volume,
        electronic_volume,
        average_volume,
        discrepancy_percent,
        unit_price,
        total_amount,
        validation_status,
    })
}

fn expect_source(reading: &Reading, expected: SourceType) -> Result<()> {
    if reading.source_type != expected {
        return Err(AuditError::SourceMismatch {
            expected,
            actual: reading.source_type,
        });
    }
    Ok(())
}

/// Per-shift roll-up of nozzle sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub nozzle_count: usize,
    pub total_volume: Decimal,
    pub total_amount: Decimal,
    pub failing_nozzles: Vec<String>,
}

impl SalesSummary {
    pub fn from_sales(sales: &[SaleComputation]) -> Result<Self> {
        Ok(Self {
            nozzle_count: sales.len(),
            total_volume: checked_total(sales.iter().map(|s| s.average_volume), "total volume")?,
            total_amount: checked_total(sales.iter().map(|s| s.total_amount), "total amount")?,
            failing_nozzles: sales
                .iter()
                .filter(|s| s.validation_status == SaleStatus::Fail)
                .map(|s| s.nozzle_id.clone())
                .collect(),
        })
    }

    pub fn all_pass(&self) -> bool {
        self.failing_nozzles.is_empty()
    }
}

fn checked_total(mut values: impl Iterator<Item = Decimal>, context: &str) -> Result<Decimal> {
    values.try_fold(Decimal::ZERO, |total, value| {
        total
            .checked_add(value)
            .ok_or_else(|| AuditError::out_of_range(context))
    })
}
