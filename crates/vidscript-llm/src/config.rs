//! LLM settings: `llm-config.json` in the data directory, then env vars.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_PARSE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 120;

/// LLM configuration read from llm-config.json.
#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Timeout for the product-info extraction call.
    #[serde(default = "default_parse_timeout")]
    pub parse_timeout_secs: u64,
    /// Timeout for each script-generation call.
    #[serde(default = "default_generate_timeout")]
    pub generate_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_model() -> String {
    DEFAULT_MODEL.into()
}
fn default_parse_timeout() -> u64 {
    DEFAULT_PARSE_TIMEOUT_SECS
}
fn default_generate_timeout() -> u64 {
    DEFAULT_GENERATE_TIMEOUT_SECS
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.into(),
            model: DEFAULT_MODEL.into(),
            parse_timeout_secs: DEFAULT_PARSE_TIMEOUT_SECS,
            generate_timeout_secs: DEFAULT_GENERATE_TIMEOUT_SECS,
        }
    }
}

impl LLMConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config: LLMConfig = std::fs::read_to_string(config_path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();

        if config.api_key().is_none() {
            config.api_key = std::env::var("DEEPSEEK_API_KEY").ok();
        }
        if config.api_url == DEFAULT_API_URL {
            if let Ok(url) = std::env::var("DEEPSEEK_API_URL") {
                config.api_url = url;
            }
        }
        if config.model == DEFAULT_MODEL {
            if let Ok(model) = std::env::var("DEEPSEEK_MODEL") {
                config.model = model;
            }
        }

        config
    }

    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn parse_timeout(&self) -> Duration {
        Duration::from_secs(self.parse_timeout_secs)
    }

    pub fn generate_timeout(&self) -> Duration {
        Duration::from_secs(self.generate_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = LLMConfig::load(&tmp.path().join("llm-config.json"));
        assert_eq!(config.parse_timeout_secs, DEFAULT_PARSE_TIMEOUT_SECS);
        assert_eq!(config.generate_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_partial_file_gets_serde_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("llm-config.json");
        std::fs::write(&path, r#"{"api_key":"sk-file","parse_timeout_secs":5}"#).unwrap();

        let config = LLMConfig::load(&path);
        assert_eq!(config.api_key(), Some("sk-file"));
        assert_eq!(config.parse_timeout(), Duration::from_secs(5));
        assert_eq!(config.generate_timeout_secs, DEFAULT_GENERATE_TIMEOUT_SECS);
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let config = LLMConfig {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }
}
