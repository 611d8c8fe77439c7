use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct AuditEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> AuditEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting audit run...");

        // Extract
        let input = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} submission (pass {}%, warning {}%, sale tolerance {}%)",
            input.submission.kind(),
            input.settings.thresholds.pass_threshold,
            input.settings.thresholds.warning_threshold,
            input.settings.sale_tolerance.percent
        );

        // Transform
        let outcome = self.pipeline.transform(input).await?;
        tracing::debug!("Evaluation finished: {:?}", outcome);

        // Load
        let output_path = self.pipeline.load(outcome).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
