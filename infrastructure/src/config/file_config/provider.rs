//! Generation provider configuration from TOML (`[provider]` section)

use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Base URL up to and including the API version (default: "https://api.openai.com/v1").
    pub base_url: String,
    /// Model used for proposal, consultation and synthesis.
    pub model: String,
    /// Environment variable name for the API key (default: "OPENAI_API_KEY").
    pub api_key_env: String,
    /// Direct API key; prefer `api_key_env`.
    pub api_key: Option<String>,
    /// HTTP timeout per request in seconds.
    pub timeout_seconds: u64,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            timeout_seconds: 120,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl FileProviderConfig {
    /// Direct key first, then the configured environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_key_wins() {
        let config = FileProviderConfig {
            api_key: Some("sk-direct".to_string()),
            api_key_env: "PANEL_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-direct"));
    }

    #[test]
    fn test_missing_key_is_none() {
        let config = FileProviderConfig {
            api_key: Some("  ".to_string()),
            api_key_env: "PANEL_TEST_DEFINITELY_UNSET_KEY".to_string(),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
    }
}
