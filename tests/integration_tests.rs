use anyhow::Result;
use chrono::NaiveDate;
use fuel_audit::{
    AuditEngine, CliConfig, HttpSettingsProvider, LocalStorage, Role, SessionContext,
    SubmissionPipeline,
};
use httpmock::prelude::*;
use tempfile::TempDir;

fn cli_config(input: String, output_path: String) -> CliConfig {
    CliConfig {
        input,
        output_path,
        config: None,
        settings_url: None,
        user: "att-1".to_string(),
        role: "user".to_string(),
        station: Some("ST-001".to_string()),
        token: None,
        confirm_warnings: false,
        date: NaiveDate::from_ymd_opt(2026, 10, 16),
        verbose: false,
        log_json: false,
    }
}

#[tokio::test]
async fn test_end_to_end_sale_with_backend_settings() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_string_lossy().to_string();

    let input_path = temp_dir.path().join("sale.json");
    std::fs::write(
        &input_path,
        r#"{
            "kind": "sale",
            "nozzle_id": "N1",
            "unit_price": "150.00",
            "mechanical": {"source_type": "mechanical", "opening_value": "10000", "closing_value": "12345.50"},
            "electronic": {"source_type": "electronic", "opening_value": "10000", "closing_value": "12345.00"}
        }"#,
    )?;

    let server = MockServer::start_async().await;
    let settings_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/settings/validation")
                .query_param("stationId", "ST-001");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "passThreshold": 0.5,
                    "warningThreshold": 1.0,
                    "meterDiscrepancyPercent": 0.03
                }));
        })
        .await;

    let output_path = format!("{}/out", base);
    let config = cli_config(input_path.to_string_lossy().to_string(), output_path.clone());
    let session = SessionContext::new("att-1", "ST-001", Role::User);
    let provider = HttpSettingsProvider::new(server.base_url())?;
    let pipeline = SubmissionPipeline::new(LocalStorage::new(base.clone()), provider, config, session);

    let result_path = AuditEngine::new(pipeline).run().await?;
    settings_mock.assert_async().await;
    assert!(result_path.ends_with("audit_result.json"));

    let record: serde_json::Value =
        serde_json::from_slice(&std::fs::read(format!("{}/audit_result.json", output_path))?)?;
    assert_eq!(record["station_id"], "ST-001");
    assert_eq!(record["role"], "user");
    assert_eq!(record["outcome"]["kind"], "sale");
    assert_eq!(record["outcome"]["sale"]["average_volume"], "2345.25");
    assert_eq!(record["outcome"]["sale"]["discrepancy_percent"], "0.0213");
    assert_eq!(record["outcome"]["sale"]["total_amount"], "351787.50");
    assert_eq!(record["outcome"]["sale"]["validation_status"], "PASS");

    let csv_content = std::fs::read_to_string(format!("{}/sales_report.csv", output_path))?;
    let mut lines = csv_content.lines();
    assert_eq!(
        lines.next(),
        Some("nozzle_id,mechanical_volume,electronic_volume,average_volume,discrepancy_percent,unit_price,total_amount,validation_status")
    );
    assert_eq!(
        lines.next(),
        Some("N1,2345.50,2345.00,2345.25,0.0213,150.00,351787.50,PASS")
    );

    Ok(())
}

#[tokio::test]
async fn test_tank_check_with_dip_writes_no_sales_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_string_lossy().to_string();

    std::fs::write(
        temp_dir.path().join("tank.json"),
        r#"{
            "kind": "tank_check",
            "tank_id": "T2",
            "readings": [
                {"source_type": "mechanical", "opening_value": "0", "closing_value": "4000"},
                {"source_type": "electronic", "opening_value": "0", "closing_value": "4030"}
            ],
            "dip": {"opening_depth_cm": "150", "closing_depth_cm": "100", "delivered_litres": "500"},
            "calibration": [["0", "0"], ["100", "5000"], ["200", "12000"]]
        }"#,
    )?;

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/settings/validation");
            then.status(200).json_body(serde_json::json!({
                "passThreshold": 0.5,
                "warningThreshold": 1.0
            }));
        })
        .await;

    let output_path = format!("{}/out", base);
    let config = cli_config("tank.json".to_string(), output_path.clone());
    let session = SessionContext::new("att-1", "ST-001", Role::User);
    let pipeline = SubmissionPipeline::new(
        LocalStorage::new(base.clone()),
        HttpSettingsProvider::new(server.base_url())?,
        config,
        session,
    );

    AuditEngine::new(pipeline).run().await?;

    let record: serde_json::Value =
        serde_json::from_slice(&std::fs::read(format!("{}/audit_result.json", output_path))?)?;
    let result = &record["outcome"]["result"];
    assert_eq!(record["outcome"]["tank_id"], "T2");
    // 8500 + 500 - 5000 = 4000 L from the dip; electronic differs by 30 L
    assert_eq!(result["per_pair_discrepancies"].as_array().map(Vec::len), Some(3));
    assert_eq!(result["max_discrepancy_percent"], "0.7472");
    assert_eq!(result["status"], "WARNING");
    assert!(!std::path::Path::new(&format!("{}/sales_report.csv", output_path)).exists());

    Ok(())
}
