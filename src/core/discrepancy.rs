use crate::domain::model::{
    PairDiscrepancy, Reading, SourceType, ValidationResult, ValidationThresholds, MAX_METER_VALUE,
};
use crate::utils::error::{AuditError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

const PERCENT_DP: u32 = 4;

/// Pairwise percentage discrepancy: |a - b| / mean(a, b) * 100, rounded to
/// four decimal places. A zero mean yields zero.
pub fn discrepancy_percent(a: Decimal, b: Decimal) -> Result<Decimal> {
    let overflow = || AuditError::out_of_range("discrepancy percent");
    let average = a.checked_add(b).ok_or_else(overflow)? / dec!(2);
    if average.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let difference = a.checked_sub(b).ok_or_else(overflow)?.abs();
    let percent = difference
        .checked_div(average)
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or_else(overflow)?;
    Ok(percent.round_dp_with_strategy(PERCENT_DP, RoundingStrategy::MidpointAwayFromZero))
}

/// 同一事件的二到三個讀數，來源不可重複
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscrepancySet {
    readings: Vec<Reading>,
}

impl DiscrepancySet {
    pub fn new(readings: impl IntoIterator<Item = Reading>) -> Result<Self> {
        let mut readings: Vec<Reading> = readings.into_iter().collect();

        if readings.len() < 2 {
            return Err(AuditError::InsufficientReadings {
                count: readings.len(),
            });
        }
        if readings.len() > 3 {
            return Err(AuditError::TooManyReadings {
                count: readings.len(),
            });
        }

        for reading in &readings {
            reading.validate()?;
        }

        // mechanical < electronic < dip，配對順序固定
        readings.sort_by_key(|r| r.source_type);
        if let Some(pair) = readings
            .windows(2)
            .find(|pair| pair[0].source_type == pair[1].source_type)
        {
            return Err(AuditError::DuplicateSource {
                source_type: pair[0].source_type,
            });
        }

        Ok(Self { readings })
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn validate(&self, thresholds: &ValidationThresholds) -> Result<ValidationResult> {
        let volumes: Vec<(SourceType, Decimal)> = self
            .readings
            .iter()
            .map(|r| (r.source_type, r.volume()))
            .collect();
        evaluate_pairs(&volumes, thresholds)
    }
}

/// Same rule as [`DiscrepancySet::validate`] over volumes that were already
/// derived by the caller.
pub fn validate_volumes(
    volumes: &[(SourceType, Decimal)],
    thresholds: &ValidationThresholds,
) -> Result<ValidationResult> {
    if volumes.len() < 2 {
        return Err(AuditError::InsufficientReadings {
            count: volumes.len(),
        });
    }
    if volumes.len() > 3 {
        return Err(AuditError::TooManyReadings {
            count: volumes.len(),
        });
    }

    let mut sorted = volumes.to_vec();
    sorted.sort_by_key(|(source, _)| *source);
    for pair in sorted.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(AuditError::DuplicateSource {
                source_type: pair[0].0,
            });
        }
    }
    for (source_type, volume) in &sorted {
        let reason = if *volume < Decimal::ZERO {
            "volume cannot be negative"
        } else if *volume > MAX_METER_VALUE {
            "volume is out of range"
        } else {
            continue;
        };
        return Err(AuditError::InvalidReading {
            source_type: *source_type,
            opening: Decimal::ZERO,
            closing: *volume,
            reason: reason.to_string(),
        });
    }

    evaluate_pairs(&sorted, thresholds)
}

fn evaluate_pairs(
    volumes: &[(SourceType, Decimal)],
    thresholds: &ValidationThresholds,
) -> Result<ValidationResult> {
    let mut per_pair_discrepancies = Vec::new();
    for (i, (first, first_volume)) in volumes.iter().enumerate() {
        for (second, second_volume) in &volumes[i + 1..] {
            per_pair_discrepancies.push(PairDiscrepancy {
                first: *first,
                second: *second,
                first_volume: *first_volume,
                second_volume: *second_volume,
                discrepancy_percent: discrepancy_percent(*first_volume, *second_volume)?,
            });
        }
    }

    let max_discrepancy_percent = per_pair_discrepancies
        .iter()
        .map(|p| p.discrepancy_percent)
        .max()
        .unwrap_or(Decimal::ZERO);
    let status = thresholds.classify(max_discrepancy_percent);

    tracing::debug!(
        "Discrepancy check: {} pair(s), max {}% -> {}",
        per_pair_discrepancies.len(),
        max_discrepancy_percent,
        status
    );

    Ok(ValidationResult {
        max_discrepancy_percent,
        status,
        per_pair_discrepancies,
    })
}
