//! Oracle configuration.

use std::time::Duration;

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default hard limit on one interpretation call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default minimum time between submit and reveal.
pub const DEFAULT_MIN_REVEAL: Duration = Duration::from_secs(3);

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "GEMINI_BASE_URL";
/// Environment variable overriding the model.
pub const ENV_MODEL: &str = "GEMINI_MODEL";

/// Settings for the interpretation service and the reveal timing.
#[derive(Clone)]
pub struct OracleConfig {
    /// Service root, without the `/v1beta/...` suffix.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// API key; requests fail with `MissingCredential` when absent.
    pub api_key: Option<String>,
    /// Hard timeout for one interpretation.
    pub request_timeout: Duration,
    /// Minimum processing time shown to the user.
    pub min_reveal: Duration,
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("min_reveal", &self.min_reveal)
            .finish()
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            min_reveal: DEFAULT_MIN_REVEAL,
        }
    }
}

impl OracleConfig {
    /// Defaults overridden by `GEMINI_API_KEY`, `GEMINI_BASE_URL` and
    /// `GEMINI_MODEL`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the environment
    /// variable names. Blank values are ignored.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            base_url: get(ENV_BASE_URL).unwrap_or(defaults.base_url),
            model: get(ENV_MODEL).unwrap_or(defaults.model),
            api_key: get(ENV_API_KEY),
            ..defaults
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the minimum reveal delay.
    #[must_use]
    pub fn with_min_reveal(mut self, delay: Duration) -> Self {
        self.min_reveal = delay;
        self
    }
}
