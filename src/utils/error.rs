use crate::domain::model::SourceType;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Invalid {source_type} reading: opening {opening}, closing {closing} ({reason})")]
    InvalidReading {
        source_type: SourceType,
        opening: Decimal,
        closing: Decimal,
        reason: String,
    },

    #[error("At least two readings are required, got {count}")]
    InsufficientReadings { count: usize },

    #[error("At most three readings are allowed, got {count}")]
    TooManyReadings { count: usize },

    #[error("Duplicate {source_type} reading in discrepancy set")]
    DuplicateSource { source_type: SourceType },

    #[error("Expected a {expected} reading, got {actual}")]
    SourceMismatch {
        expected: SourceType,
        actual: SourceType,
    },

    #[error("Invalid unit price {price}: {reason}")]
    InvalidPrice { price: Decimal, reason: String },

    #[error("Amount out of range for {context}")]
    AmountOutOfRange { context: String },

    #[error("Calibration error: {message}")]
    Calibration { message: String },

    #[error("Shift submission blocked by {errors} error(s)")]
    ShiftBlocked { errors: usize, messages: Vec<String> },

    #[error("Shift submission has {warnings} warning(s) that need confirmation")]
    ConfirmationRequired { warnings: usize, messages: Vec<String> },

    #[error("Role {role} is not allowed to {action}")]
    PermissionDenied { role: String, action: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    ApiStatus { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Reading,
    Validation,
    Authorization,
    Network,
    Io,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 依錯誤嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl AuditError {
    pub(crate) fn out_of_range(context: &str) -> Self {
        AuditError::AmountOutOfRange {
            context: context.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AuditError::InvalidReading { .. }
            | AuditError::InsufficientReadings { .. }
            | AuditError::TooManyReadings { .. }
            | AuditError::DuplicateSource { .. }
            | AuditError::SourceMismatch { .. }
            | AuditError::InvalidPrice { .. }
            | AuditError::AmountOutOfRange { .. }
            | AuditError::Calibration { .. } => ErrorCategory::Reading,
            AuditError::ShiftBlocked { .. } | AuditError::ConfirmationRequired { .. } => {
                ErrorCategory::Validation
            }
            AuditError::PermissionDenied { .. } => ErrorCategory::Authorization,
            AuditError::ApiError(_) | AuditError::ApiStatus { .. } => ErrorCategory::Network,
            AuditError::IoError(_)
            | AuditError::CsvError(_)
            | AuditError::SerializationError(_) => ErrorCategory::Io,
            AuditError::TomlError(_)
            | AuditError::ConfigError { .. }
            | AuditError::InvalidConfigValueError { .. }
            | AuditError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AuditError::ConfirmationRequired { .. } => ErrorSeverity::Low,
            AuditError::ApiError(_) | AuditError::ApiStatus { .. } => ErrorSeverity::Medium,
            AuditError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AuditError::InvalidReading {
                source_type,
                reason,
                ..
            } => format!("The {} reading was rejected: {}", source_type, reason),
            AuditError::ShiftBlocked { messages, .. }
            | AuditError::ConfirmationRequired { messages, .. } => {
                format!("{}\n{}", self, messages.join("\n"))
            }
            AuditError::PermissionDenied { role, action } => {
                format!("Your role ({}) cannot {}", role, action)
            }
            AuditError::ApiError(_) | AuditError::ApiStatus { .. } => {
                "Could not reach the station settings service".to_string()
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Reading => "Re-enter the affected meter or dip values and submit again",
            ErrorCategory::Validation => match self {
                AuditError::ConfirmationRequired { .. } => {
                    "Review the warnings and re-run with --confirm-warnings"
                }
                _ => "Fix the listed errors in the shift assignment",
            },
            ErrorCategory::Authorization => "Ask a supervisor or the station owner to submit this",
            ErrorCategory::Network => "Check the backend endpoint and your network, then retry",
            ErrorCategory::Io => "Check that the input file exists and the output path is writable",
            ErrorCategory::Configuration => "Check the station configuration file",
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
