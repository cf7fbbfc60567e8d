//! Client configuration.
//!
//! Defaults suit a backend running locally. Every field can be overridden
//! from the environment or with the `with_*` builder methods.
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `LILLY_API_BASE_URL` | Backend base URL |
//! | `LILLY_IDLE_TIMEOUT_SECS` | Fail a stream after this many idle seconds (`0` disables) |
//! | `LILLY_REQUEST_TIMEOUT_SECS` | Deadline for non-streaming calls |
//! | `LILLY_KEEP_CONTROL_CHARS` | When set, fragments are not sanitized |

use std::time::Duration;

use crate::stream::SessionOptions;

/// Base URL used when `LILLY_API_BASE_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Deadline for buffered (non-streaming) requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`crate::client::LillyClient`].
///
/// # Example
///
/// ```
/// use lilly::config::LillyConfig;
/// use std::time::Duration;
///
/// let config = LillyConfig::default()
///     .with_base_url("http://lilly.internal:8000")
///     .with_idle_timeout(Some(Duration::from_secs(30)));
/// assert_eq!(config.base_url, "http://lilly.internal:8000");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LillyConfig {
    /// Backend base URL, without trailing slash
    pub base_url: String,
    /// Maximum gap between stream chunks; `None` waits forever
    pub idle_timeout: Option<Duration>,
    /// Deadline for non-streaming calls
    pub request_timeout: Duration,
    /// Fragment cleaning options for each stream session
    pub session: SessionOptions,
}

impl Default for LillyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            idle_timeout: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            session: SessionOptions::default(),
        }
    }
}

impl LillyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend base URL. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_session_options(mut self, options: SessionOptions) -> Self {
        self.session = options;
        self
    }

    /// Build config from `LILLY_*` environment variables.
    ///
    /// Unparseable numbers are ignored with a warning and the default kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("LILLY_API_BASE_URL") {
            if !url.trim().is_empty() {
                config = config.with_base_url(url.trim());
            }
        }

        if let Some(secs) = env_secs("LILLY_IDLE_TIMEOUT_SECS") {
            config.idle_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(secs) = env_secs("LILLY_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }

        if std::env::var("LILLY_KEEP_CONTROL_CHARS").is_ok() {
            config.session.strip_control_chars = false;
        }

        config
    }

    /// Full URL for an API path such as `/api/lilly/chat`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn env_secs(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(e) => {
            tracing::warn!(var = name, value = %raw, error = %e, "ignoring invalid duration");
            None
        }
    }
}
