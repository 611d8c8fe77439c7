use crate::config::toml_config::{BackendConfig, StationConfig};
use crate::domain::model::{SaleTolerance, StationSettings, ValidationThresholds};
use crate::domain::ports::SettingsProvider;
use crate::domain::session::SessionContext;
use crate::utils::error::{AuditError, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Settings fixed at startup, typically from the station TOML file.
#[derive(Debug, Clone, Default)]
pub struct StaticSettingsProvider {
    settings: StationSettings,
}

impl StaticSettingsProvider {
    pub fn new(settings: StationSettings) -> Self {
        Self { settings }
    }

    pub fn from_config(config: &StationConfig) -> Result<Self> {
        Ok(Self::new(config.settings()?))
    }
}

#[async_trait]
impl SettingsProvider for StaticSettingsProvider {
    async fn fetch_settings(&self, _session: &SessionContext) -> Result<StationSettings> {
        Ok(self.settings)
    }
}

/// 後端回傳的設定格式
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationSettingsPayload {
    pass_threshold: Decimal,
    warning_threshold: Decimal,
    meter_discrepancy_percent: Option<Decimal>,
}

/// Reads thresholds from the REST backend on every call.
pub struct HttpSettingsProvider {
    endpoint: String,
    client: Client,
}

impl HttpSettingsProvider {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_timeout(endpoint, Duration::from_secs(10))
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn from_backend(backend: &BackendConfig) -> Result<Self> {
        Self::with_timeout(
            backend.endpoint.clone(),
            Duration::from_secs(backend.timeout_seconds()),
        )
    }

    fn settings_url(&self) -> String {
        format!(
            "{}/settings/validation",
            self.endpoint.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SettingsProvider for HttpSettingsProvider {
    async fn fetch_settings(&self, session: &SessionContext) -> Result<StationSettings> {
        let url = self.settings_url();
        tracing::debug!("Fetching validation settings from: {}", url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("stationId", session.station_id.as_str())]);
        if let Some(token) = &session.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Settings response status: {}", status);

        if !status.is_success() {
            return Err(AuditError::ApiStatus {
                status: status.as_u16(),
                url,
            });
        }

        let payload: ValidationSettingsPayload = response.json().await?;
        let sale_tolerance = match payload.meter_discrepancy_percent {
            Some(percent) => SaleTolerance::new(percent)?,
            None => SaleTolerance::default(),
        };

        Ok(StationSettings {
            thresholds: ValidationThresholds::new(
                payload.pass_threshold,
                payload.warning_threshold,
            )?,
            sale_tolerance,
        })
    }
}
