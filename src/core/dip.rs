//! Tank dip conversion: depth in centimetres to litres through an externally
//! supplied calibration table, and from a pair of dips to a `Dip` reading.

use crate::domain::model::{Reading, SourceType};
use crate::utils::error::{AuditError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(Decimal, Decimal)>", into = "Vec<(Decimal, Decimal)>")]
pub struct CalibrationTable {
    points: Vec<(Decimal, Decimal)>,
}

impl CalibrationTable {
    pub fn new(points: Vec<(Decimal, Decimal)>) -> Result<Self> {
        if points.len() < 2 {
            return Err(AuditError::Calibration {
                message: format!("table needs at least 2 points, got {}", points.len()),
            });
        }
        for pair in points.windows(2) {
            let ((d0, l0), (d1, l1)) = (pair[0], pair[1]);
            if d1 <= d0 {
                return Err(AuditError::Calibration {
                    message: format!("depths must be strictly increasing ({} then {})", d0, d1),
                });
            }
            if l1 < l0 {
                return Err(AuditError::Calibration {
                    message: format!("litres must not decrease ({} then {})", l0, l1),
                });
            }
        }
        Ok(Self { points })
    }

    /// 線性內插，超出表格範圍視為錯誤
    pub fn litres_at(&self, depth_cm: Decimal) -> Result<Decimal> {
        let (min_depth, _) = self.points[0];
        let (max_depth, _) = self.points[self.points.len() - 1];
        if depth_cm < min_depth || depth_cm > max_depth {
            return Err(AuditError::Calibration {
                message: format!(
                    "depth {} cm is outside the table range {}..={} cm",
                    depth_cm, min_depth, max_depth
                ),
            });
        }

        for pair in self.points.windows(2) {
            let ((d0, l0), (d1, l1)) = (pair[0], pair[1]);
            if depth_cm <= d1 {
                return l1
                    .checked_sub(l0)
                    .zip(depth_cm.checked_sub(d0))
                    .and_then(|(litres, depth)| litres.checked_mul(depth))
                    .zip(d1.checked_sub(d0))
                    .and_then(|(scaled, span)| scaled.checked_div(span))
                    .and_then(|offset| l0.checked_add(offset))
                    .ok_or_else(|| AuditError::Calibration {
                        message: format!("litres at {} cm are out of range", depth_cm),
                    });
            }
        }
        Ok(self.points[self.points.len() - 1].1)
    }
}

impl TryFrom<Vec<(Decimal, Decimal)>> for CalibrationTable {
    type Error = AuditError;

    fn try_from(points: Vec<(Decimal, Decimal)>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<CalibrationTable> for Vec<(Decimal, Decimal)> {
    fn from(table: CalibrationTable) -> Self {
        table.points
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DipMeasurement {
    pub opening_depth_cm: Decimal,
    pub closing_depth_cm: Decimal,
    #[serde(default)]
    pub delivered_litres: Decimal,
}

impl DipMeasurement {
    /// Litres drawn from the tank as a `Dip` reading. The reading runs from
    /// closing stock up to opening stock plus deliveries, so an unexplained
    /// rise in stock surfaces as an invalid reading.
    pub fn to_reading(&self, table: &CalibrationTable) -> Result<Reading> {
        if self.delivered_litres < Decimal::ZERO {
            return Err(AuditError::Calibration {
                message: format!("delivered litres cannot be negative: {}", self.delivered_litres),
            });
        }
        let opening_stock = table.litres_at(self.opening_depth_cm)?;
        let closing_stock = table.litres_at(self.closing_depth_cm)?;

        tracing::debug!(
            "Dip: {} cm -> {} L, {} cm -> {} L, delivered {} L",
            self.opening_depth_cm,
            opening_stock,
            self.closing_depth_cm,
            closing_stock,
            self.delivered_litres
        );

        let available = opening_stock
            .checked_add(self.delivered_litres)
            .ok_or_else(|| AuditError::Calibration {
                message: format!(
                    "opening stock {} L plus {} L delivered is out of range",
                    opening_stock, self.delivered_litres
                ),
            })?;
        Reading::new(SourceType::Dip, closing_stock, available)
    }
}
