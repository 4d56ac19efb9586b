//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types
//! after validation.

mod consultation;
mod logging;
mod provider;
mod roles;

pub use consultation::FileConsultationConfig;
pub use logging::FileLoggingConfig;
pub use provider::FileProviderConfig;
pub use roles::FileRoleConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("consultation.max_concurrency cannot be 0")]
    InvalidConcurrency,

    #[error("consultation.max_roles cannot be 0")]
    InvalidMaxRoles,

    #[error("{0} cannot be 0")]
    InvalidTimeout(&'static str),

    #[error("unknown expertise level '{0}' (expected junior, mid, senior or expert)")]
    InvalidExpertiseLevel(String),

    #[error("provider.model cannot be empty")]
    EmptyModelName,

    #[error("role id cannot be empty")]
    EmptyRoleId,

    #[error("role id '{0}' is defined more than once")]
    DuplicateRoleId(String),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Orchestration tuning
    pub consultation: FileConsultationConfig,
    /// Generation endpoint
    pub provider: FileProviderConfig,
    /// Extra roles added to (or replacing) the built-in catalog
    pub roles: Vec<FileRoleConfig>,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.consultation.validate()?;

        if self.provider.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout("provider.timeout_seconds"));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }

        let mut seen = HashSet::new();
        for role in &self.roles {
            let id = role.id.trim();
            if id.is_empty() {
                return Err(ConfigValidationError::EmptyRoleId);
            }
            if !seen.insert(id) {
                return Err(ConfigValidationError::DuplicateRoleId(id.to_string()));
            }
        }

        Ok(())
    }
}
