use crate::domain::model::StationSettings;
use crate::domain::session::SessionContext;
use crate::domain::submission::{AuditOutcome, Submission};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn confirm_warnings(&self) -> bool;
    fn today(&self) -> NaiveDate;
}

/// Source of validation thresholds. Values may change between calls;
/// results already computed keep the values they were computed with.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn fetch_settings(&self, session: &SessionContext) -> Result<StationSettings>;
}

#[derive(Debug, Clone)]
pub struct AuditInput {
    pub submission: Submission,
    pub settings: StationSettings,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<AuditInput>;
    async fn transform(&self, input: AuditInput) -> Result<AuditOutcome>;
    async fn load(&self, outcome: AuditOutcome) -> Result<String>;
}
