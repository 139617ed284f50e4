use serde::{Deserialize, Serialize};
use shopchat_types::DEFAULT_API_URL;
use std::env;

/// Connection settings for the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin of the backend, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Log request and response bodies at debug level
    #[serde(default)]
    pub verbose: bool,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Read `SHOPCHAT_API_URL` and `SHOPCHAT_VERBOSE`, falling back to defaults
    pub fn from_env() -> Self {
        let base_url = env::var("SHOPCHAT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let verbose = env::var("SHOPCHAT_VERBOSE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self::new(&base_url).with_verbose(verbose)
    }
}

/// Normalize a backend URL: trim whitespace and trailing slashes, and default
/// to http when no scheme is given
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.is_empty() {
        return DEFAULT_API_URL.to_string();
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://localhost:8000/"), "http://localhost:8000");
        assert_eq!(normalize_base_url("  https://shop.example.com//  "), "https://shop.example.com");
        assert_eq!(normalize_base_url("api.internal:9000"), "http://api.internal:9000");
        assert_eq!(normalize_base_url(""), DEFAULT_API_URL);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ApiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ApiConfig::default());

        let config: ApiConfig = serde_json::from_str(r#"{"verbose":true}"#).unwrap();
        assert!(config.verbose);
        assert_eq!(config.base_url, DEFAULT_API_URL);
    }
}
