pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::StationConfig};

pub use adapters::{HttpSettingsProvider, StaticSettingsProvider};
pub use app::pipelines::SubmissionPipeline;
pub use crate::core::engine::AuditEngine;
pub use domain::model::{
    Reading, SaleComputation, SaleStatus, SaleTolerance, SourceType, StationSettings,
    ValidationResult, ValidationStatus, ValidationThresholds,
};
pub use domain::session::{Permission, Role, SessionContext};
pub use domain::submission::{AuditOutcome, Submission};
pub use utils::error::{AuditError, Result};
