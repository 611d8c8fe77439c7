use crate::core::audit::{evaluate, EvaluationOptions};
use crate::core::{AuditInput, ConfigProvider, Pipeline, SaleComputation, SettingsProvider, Storage};
use crate::domain::session::{Role, SessionContext};
use crate::domain::submission::{AuditOutcome, Submission};
use crate::utils::error::{AuditError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const RESULT_FILE: &str = "audit_result.json";
pub const SALES_REPORT_FILE: &str = "sales_report.csv";

/// 輸出檔內容，附上送出者資訊
#[derive(Debug, Serialize)]
struct AuditRecord<'a> {
    station_id: &'a str,
    user_id: &'a str,
    role: Role,
    generated_at: DateTime<Utc>,
    outcome: &'a AuditOutcome,
}

pub struct SubmissionPipeline<S: Storage, P: SettingsProvider, C: ConfigProvider> {
    storage: S,
    settings: P,
    config: C,
    session: SessionContext,
}

impl<S: Storage, P: SettingsProvider, C: ConfigProvider> SubmissionPipeline<S, P, C> {
    pub fn new(storage: S, settings: P, config: C, session: SessionContext) -> Self {
        Self {
            storage,
            settings,
            config,
            session,
        }
    }

    fn sales_csv(sales: &[SaleComputation]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for sale in sales {
            writer.serialize(sale)?;
        }
        writer
            .into_inner()
            .map_err(|e| AuditError::IoError(e.into_error()))
    }
}

#[async_trait::async_trait]
impl<S: Storage, P: SettingsProvider, C: ConfigProvider> Pipeline for SubmissionPipeline<S, P, C> {
    async fn extract(&self) -> Result<AuditInput> {
        tracing::debug!("Reading submission from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;
        let submission = Submission::from_json(&bytes)?;

        // 每次執行都重新取得門檻值
        let settings = self.settings.fetch_settings(&self.session).await?;

        Ok(AuditInput {
            submission,
            settings,
        })
    }

    async fn transform(&self, input: AuditInput) -> Result<AuditOutcome> {
        let options = EvaluationOptions {
            today: self.config.today(),
            confirm_warnings: self.config.confirm_warnings(),
        };
        evaluate(&self.session, &input.submission, &input.settings, options)
    }

    async fn load(&self, outcome: AuditOutcome) -> Result<String> {
        let output_dir = self.config.output_path().trim_end_matches('/');

        let sales = outcome.sales();
        if !sales.is_empty() {
            let report_path = format!("{}/{}", output_dir, SALES_REPORT_FILE);
            tracing::debug!("Writing {} sale row(s) to {}", sales.len(), report_path);
            self.storage
                .write_file(&report_path, &Self::sales_csv(sales)?)
                .await?;
        }

        let record = AuditRecord {
            station_id: &self.session.station_id,
            user_id: &self.session.user_id,
            role: self.session.role,
            generated_at: Utc::now(),
            outcome: &outcome,
        };
        let result_path = format!("{}/{}", output_dir, RESULT_FILE);
        self.storage
            .write_file(&result_path, &serde_json::to_vec_pretty(&record)?)
            .await?;

        Ok(result_path)
    }
}
