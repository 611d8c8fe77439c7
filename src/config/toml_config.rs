use crate::domain::model::{SaleTolerance, StationSettings, ValidationThresholds};
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_url, Validate,
};
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    pub station: StationInfo,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub sales: SalesConfig,
    pub backend: Option<BackendConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationInfo {
    pub id: String,
    pub name: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub pass_threshold: Decimal,
    pub warning_threshold: Decimal,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        let defaults = ValidationThresholds::default();
        Self {
            pass_threshold: defaults.pass_threshold,
            warning_threshold: defaults.warning_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesConfig {
    pub tolerance_percent: Decimal,
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            tolerance_percent: SaleTolerance::default().percent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

impl BackendConfig {
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(10)
    }
}

impl StationConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AuditError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${FUEL_BACKEND_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AuditError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn settings(&self) -> Result<StationSettings> {
        Ok(StationSettings {
            thresholds: ValidationThresholds::new(
                self.thresholds.pass_threshold,
                self.thresholds.warning_threshold,
            )?,
            sale_tolerance: SaleTolerance::new(self.sales.tolerance_percent)?,
        })
    }

    pub fn station_id(&self) -> &str {
        &self.station.id
    }

    pub fn backend_endpoint(&self) -> Option<&str> {
        self.backend.as_ref().map(|b| b.endpoint.as_str())
    }
}

impl Validate for StationConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("station.id", &self.station.id)?;

        // 門檻值順序與範圍
        self.settings()?;
        validate_range(
            "thresholds.warning_threshold",
            self.thresholds.warning_threshold,
            Decimal::ZERO,
            dec!(100),
        )?;
        validate_range(
            "sales.tolerance_percent",
            self.sales.tolerance_percent,
            Decimal::ZERO,
            dec!(100),
        )?;

        if let Some(backend) = &self.backend {
            validate_url("backend.endpoint", &backend.endpoint)?;
            validate_range("backend.timeout_seconds", backend.timeout_seconds(), 1, 300)?;
        }

        Ok(())
    }
}
