//! Consultation configuration from TOML (`[consultation]` section)

use super::ConfigValidationError;
use panel_application::ConsultationParams;
use panel_domain::ExpertiseLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsultationConfig {
    /// Delegate generation calls in flight at once (default: 8)
    pub max_concurrency: usize,
    /// Per-delegate timeout in seconds (default: 180)
    pub delegate_timeout_seconds: u64,
    /// Roles accepted from one proposal (default: 6)
    pub max_roles: usize,
    /// "junior", "mid", "senior" or "expert" (default: "senior")
    pub expertise_level: String,
    /// Send the master node's conversation to every delegate
    pub include_master_context: bool,
}

impl Default for FileConsultationConfig {
    fn default() -> Self {
        let params = ConsultationParams::default();
        Self {
            max_concurrency: params.max_concurrency,
            delegate_timeout_seconds: params.delegate_timeout.as_secs(),
            max_roles: params.max_roles,
            expertise_level: params.expertise_level.as_str().to_string(),
            include_master_context: params.include_master_context,
        }
    }
}

impl FileConsultationConfig {
    pub fn expertise_level(&self) -> Result<ExpertiseLevel, ConfigValidationError> {
        self.expertise_level
            .parse()
            .map_err(|_| ConfigValidationError::InvalidExpertiseLevel(self.expertise_level.clone()))
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_concurrency == 0 {
            return Err(ConfigValidationError::InvalidConcurrency);
        }
        if self.max_roles == 0 {
            return Err(ConfigValidationError::InvalidMaxRoles);
        }
        if self.delegate_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout("delegate_timeout_seconds"));
        }
        self.expertise_level()?;
        Ok(())
    }

    pub fn to_params(&self) -> Result<ConsultationParams, ConfigValidationError> {
        self.validate()?;
        Ok(ConsultationParams::default()
            .with_max_concurrency(self.max_concurrency)
            .with_delegate_timeout(Duration::from_secs(self.delegate_timeout_seconds))
            .with_max_roles(self.max_roles)
            .with_expertise_level(self.expertise_level()?)
            .with_master_context(self.include_master_context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_params() {
        let params = FileConsultationConfig::default().to_params().unwrap();
        assert_eq!(params, ConsultationParams::default());
    }

    #[test]
    fn test_to_params_converts_units_and_level() {
        let config = FileConsultationConfig {
            max_concurrency: 2,
            delegate_timeout_seconds: 30,
            expertise_level: "Expert".to_string(),
            include_master_context: true,
            ..Default::default()
        };
        let params = config.to_params().unwrap();
        assert_eq!(params.max_concurrency, 2);
        assert_eq!(params.delegate_timeout, Duration::from_secs(30));
        assert_eq!(params.expertise_level, ExpertiseLevel::Expert);
        assert!(params.include_master_context);
    }

    #[test]
    fn test_unknown_level_rejected() {
        let config = FileConsultationConfig {
            expertise_level: "wizard".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidExpertiseLevel("wizard".to_string()))
        );
    }
}
