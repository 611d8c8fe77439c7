pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::session::{Permission, Role, SessionContext};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, validate_url, Validate};
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::fmt;

#[cfg(feature = "cli")]
#[derive(Clone, Parser)]
#[command(name = "fuel-audit")]
#[command(about = "Validate fuel readings, sales and shift assignments for a station")]
pub struct CliConfig {
    /// Submission JSON file (tank_check, sale, sales_batch or shift)
    #[arg(long)]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Station TOML configuration
    #[arg(long)]
    pub config: Option<String>,

    /// Fetch thresholds from the backend instead of the config file
    #[arg(long)]
    pub settings_url: Option<String>,

    #[arg(long, default_value = "local")]
    pub user: String,

    #[arg(long, default_value = "user", help = "user, supervisor or owner")]
    pub role: String,

    /// Station id (defaults to the id in the station config)
    #[arg(long)]
    pub station: Option<String>,

    #[arg(long)]
    pub token: Option<String>,

    #[arg(long, help = "Proceed even if the shift check raised warnings")]
    pub confirm_warnings: bool,

    /// Date treated as today for shift checks (defaults to the local date)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn session(&self) -> Result<SessionContext> {
        let role: Role = self.role.parse()?;
        let station = self.station.as_deref().unwrap_or("default");
        let session = SessionContext::new(self.user.clone(), station, role);
        Ok(match &self.token {
            Some(token) => session.with_token(token.clone()),
            None => session,
        })
    }

    /// `--settings-url` replaces the station's configured thresholds, so only
    /// roles that may configure settings can use it.
    pub fn settings_override(&self, session: &SessionContext) -> Result<Option<&str>> {
        match self.settings_url.as_deref() {
            Some(url) => {
                session.authorize(Permission::ConfigureSettings)?;
                Ok(Some(url))
            }
            None => Ok(None),
        }
    }
}

#[cfg(feature = "cli")]
impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("input", &self.input)
            .field("output_path", &self.output_path)
            .field("config", &self.config)
            .field("settings_url", &self.settings_url)
            .field("user", &self.user)
            .field("role", &self.role)
            .field("station", &self.station)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("confirm_warnings", &self.confirm_warnings)
            .field("date", &self.date)
            .field("verbose", &self.verbose)
            .field("log_json", &self.log_json)
            .finish()
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn confirm_warnings(&self) -> bool {
        self.confirm_warnings
    }

    fn today(&self) -> NaiveDate {
        self.date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        if let Some(url) = &self.settings_url {
            validate_url("settings_url", url)?;
        }
        self.session()?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::utils::error::AuditError;

    #[test]
    fn test_parse_cli_args() {
        let config = CliConfig::try_parse_from([
            "fuel-audit",
            "--input",
            "shift.json",
            "--role",
            "supervisor",
            "--date",
            "2026-10-16",
            "--confirm-warnings",
        ])
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.session().unwrap().role, Role::Supervisor);
        assert_eq!(
            config.today(),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        );
        assert!(config.confirm_warnings());
    }

    #[test]
    fn test_invalid_role_fails_validation() {
        let config =
            CliConfig::try_parse_from(["fuel-audit", "--input", "a.json", "--role", "cashier"])
                .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_settings_url_fails_validation() {
        let config = CliConfig::try_parse_from([
            "fuel-audit",
            "--input",
            "a.json",
            "--settings-url",
            "ftp://settings",
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_output_hides_token() {
        let config = CliConfig::try_parse_from([
            "fuel-audit",
            "--input",
            "a.json",
            "--token",
            "s3cr3t-bearer",
        ])
        .unwrap();
        let output = format!("{:?}", config);
        assert!(!output.contains("s3cr3t-bearer"));
        assert!(output.contains("***"));
        assert!(output.contains("a.json"));
        assert_eq!(
            config.session().unwrap().token.as_deref(),
            Some("s3cr3t-bearer")
        );
    }

    #[test]
    fn test_settings_override_requires_configure_permission() {
        let args = |role: &'static str| {
            CliConfig::try_parse_from([
                "fuel-audit",
                "--input",
                "a.json",
                "--role",
                role,
                "--settings-url",
                "https://api.example.com",
            ])
            .unwrap()
        };

        let supervisor = args("supervisor");
        let session = supervisor.session().unwrap();
        assert!(matches!(
            supervisor.settings_override(&session),
            Err(AuditError::PermissionDenied { .. })
        ));

        let owner = args("owner");
        let session = owner.session().unwrap();
        assert_eq!(
            owner.settings_override(&session).unwrap(),
            Some("https://api.example.com")
        );
    }

    #[test]
    fn test_no_settings_override_needs_no_permission() {
        let config = CliConfig::try_parse_from(["fuel-audit", "--input", "a.json"]).unwrap();
        let session = config.session().unwrap();
        assert_eq!(config.settings_override(&session).unwrap(), None);
    }
}
