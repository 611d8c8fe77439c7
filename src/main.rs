use clap::Parser;
use fuel_audit::domain::ports::SettingsProvider;
use fuel_audit::utils::error::AuditError;
use fuel_audit::utils::{logger, validation::Validate};
use fuel_audit::{
    AuditEngine, CliConfig, HttpSettingsProvider, LocalStorage, SessionContext, StaticSettingsProvider,
    StationConfig, SubmissionPipeline,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting fuel-audit CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ Audit failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(e.severity().exit_code());
    }
}

async fn run(config: CliConfig) -> Result<(), AuditError> {
    config.validate()?;
    let mut session = config.session()?;

    let station = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading station configuration from: {}", path);
            let station = StationConfig::from_file(path)?;
            station.validate()?;
            if config.station.is_none() {
                session.station_id = station.station_id().to_string();
            }
            Some(station)
        }
        None => None,
    };

    let storage = LocalStorage::new(".".to_string());

    // --settings-url 優先（限 owner），其次是設定檔中的 backend，最後用設定檔或預設門檻
    if let Some(url) = config.settings_override(&session)?.map(str::to_string) {
        let provider = HttpSettingsProvider::new(url)?;
        return execute(storage, provider, config, session).await;
    }
    match station {
        Some(station) => match &station.backend {
            Some(backend) => {
                let provider = HttpSettingsProvider::from_backend(backend)?;
                execute(storage, provider, config, session).await
            }
            None => {
                let provider = StaticSettingsProvider::from_config(&station)?;
                execute(storage, provider, config, session).await
            }
        },
        None => {
            tracing::warn!("No station configuration given, using default thresholds");
            execute(storage, StaticSettingsProvider::default(), config, session).await
        }
    }
}

async fn execute<P: SettingsProvider>(
    storage: LocalStorage,
    provider: P,
    config: CliConfig,
    session: SessionContext,
) -> Result<(), AuditError> {
    let pipeline = SubmissionPipeline::new(storage, provider, config, session);
    let engine = AuditEngine::new(pipeline);

    let output_path = engine.run().await?;
    tracing::info!("✅ Audit completed successfully!");
    println!("✅ Audit completed successfully!");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}
