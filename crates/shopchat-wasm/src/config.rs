use serde::Deserialize;
use shopchat_api::{normalize_base_url, ApiConfig};

/// Default interval between history refreshes on the chat page
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 3000;

/// How long a toast stays on screen
pub const TOAST_DURATION_MS: u32 = 4000;

/// Page-level settings, passed to `init_app` as a JSON string
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BrowserConfig {
    #[serde(flatten)]
    pub api: ApiConfig,
    /// Refresh interval while a chat is open; 0 disables polling
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u32,
}

fn default_poll_interval() -> u32 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl BrowserConfig {
    /// Parse the optional config string; absent or blank means defaults
    pub fn parse(raw: Option<&str>) -> Result<Self, serde_json::Error> {
        let mut config = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => serde_json::from_str::<Self>(raw)?,
            _ => Self::default(),
        };
        config.api.base_url = normalize_base_url(&config.api.base_url);
        Ok(config)
    }
}
