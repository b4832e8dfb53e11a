//! Endpoint and credential configuration for the HTTP providers.

use std::time::Duration;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_LEAKCHECK_API_URL: &str = "https://leakcheck.io/api/public";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for provider and judgment-engine HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub github_api_url: String,
    pub github_token: Option<String>,
    pub leakcheck_api_url: String,
    pub gemini_api_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: None,
            leakcheck_api_url: DEFAULT_LEAKCHECK_API_URL.to_string(),
            gemini_api_url: DEFAULT_GEMINI_API_URL.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("footprintguard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ProviderConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        ProviderConfig {
            github_api_url: get("GITHUB_API_URL").unwrap_or(defaults.github_api_url),
            github_token: get("GITHUB_TOKEN"),
            leakcheck_api_url: get("LEAKCHECK_API_URL").unwrap_or(defaults.leakcheck_api_url),
            gemini_api_url: get("GEMINI_API_URL").unwrap_or(defaults.gemini_api_url),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            timeout: get("FOOTPRINT_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            user_agent: defaults.user_agent,
        }
    }

    /// Whether a judgment engine can be constructed.
    pub fn has_engine_credentials(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
