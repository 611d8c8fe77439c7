use crate::utils::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Supervisor,
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    RecordReadings,
    CreateShift,
    ConfigureSettings,
}

impl Permission {
    fn action(&self) -> &'static str {
        match self {
            Permission::RecordReadings => "record readings",
            Permission::CreateShift => "create shifts",
            Permission::ConfigureSettings => "configure station settings",
        }
    }
}

impl Role {
    pub fn allows(&self, permission: Permission) -> bool {
        match (self, permission) {
            (Role::Owner, _) => true,
            (Role::Supervisor, Permission::RecordReadings | Permission::CreateShift) => true,
            (Role::Supervisor, Permission::ConfigureSettings) => false,
            (Role::User, Permission::RecordReadings) => true,
            (Role::User, Permission::CreateShift | Permission::ConfigureSettings) => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Supervisor => write!(f, "supervisor"),
            Role::Owner => write!(f, "owner"),
        }
    }
}

impl FromStr for Role {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "supervisor" => Ok(Role::Supervisor),
            "owner" => Ok(Role::Owner),
            other => Err(AuditError::InvalidConfigValueError {
                field: "role".to_string(),
                value: other.to_string(),
                reason: "Expected one of: user, supervisor, owner".to_string(),
            }),
        }
    }
}

/// 取代前端 local storage 的顯式 session，隨請求傳入
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: String,
    pub station_id: String,
    pub role: Role,
    pub token: Option<String>,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, station_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            station_id: station_id.into(),
            role,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn authorize(&self, permission: Permission) -> Result<()> {
        if self.role.allows(permission) {
            Ok(())
        } else {
            tracing::warn!(
                "🚫 {} ({}) denied: {}",
                self.user_id,
                self.role,
                permission.action()
            );
            Err(AuditError::PermissionDenied {
                role: self.role.to_string(),
                action: permission.action().to_string(),
            })
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("station_id", &self.station_id)
            .field("role", &self.role)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}
