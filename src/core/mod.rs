pub mod audit;
pub mod dip;
pub mod discrepancy;
pub mod engine;
pub mod sale;
pub mod shift;

pub use crate::domain::model::{Reading, SaleComputation, ValidationResult};
pub use crate::domain::ports::{AuditInput, ConfigProvider, Pipeline, SettingsProvider, Storage};
pub use crate::utils::error::Result;
