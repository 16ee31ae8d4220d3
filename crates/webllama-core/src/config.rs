//! Application configuration model.
//!
//! Configuration is loaded from `config.toml` by the infrastructure layer;
//! every field has a built-in default so a missing file is never an error.

use serde::{Deserialize, Serialize};

/// Default chat-completion endpoint.
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Origin-identifying referer sent with every request.
pub const DEFAULT_REFERER: &str = "https://github.com/webllama/webllama";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_model() -> String {
    crate::DEFAULT_MODEL.to_string()
}

fn default_referer() -> String {
    DEFAULT_REFERER.to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat-completion endpoint URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Model identifier used when none is given on the command line
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Value of the origin-identifying `HTTP-Referer` header
    #[serde(default = "default_referer")]
    pub referer: String,
    /// Upper bound on a single generation request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            default_model: default_model(),
            referer: default_referer(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_secs, 120);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(r#"default_model = "meta-llama/llama-3.1-8b-instruct""#).unwrap();
        assert_eq!(config.default_model, "meta-llama/llama-3.1-8b-instruct");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.referer, DEFAULT_REFERER);
    }
}
