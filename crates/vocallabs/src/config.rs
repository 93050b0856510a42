//! Gateway configuration.

use std::time::Duration;

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.superflow.run";

/// Tokens are kept for 23 hours; the server expires them after 24.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(23 * 60 * 60);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tuning knobs for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Scheme + host the operation paths are appended to.
    pub base_url: String,
    /// How long a freshly issued token is reused.
    pub token_ttl: Duration,
    /// Per-request timeout handed to the HTTP client. `None` keeps the
    /// client's default (no timeout).
    pub timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_ttl: DEFAULT_TOKEN_TTL,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl GatewayConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join `path` onto the base URL, tolerating slashes on either side.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
