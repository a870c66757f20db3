//! Client configuration and wire constants

use reqwest::Url;
use std::time::Duration;

use super::{ClientError, ClientResult};

/// Default API root. Must keep its trailing slash, relative paths are joined onto it.
pub const DEFAULT_BASE_URL: &str = "https://api.exoclick.com/v2/";

/// Identifying `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("exoclick-rs/", env!("CARGO_PKG_VERSION"));

/// Path of the token exchange endpoint, relative to the base URL.
pub const LOGIN_PATH: &str = "login";

/// Rate limit headers returned on every response.
pub const HEADER_RATE_LIMIT: &str = "x-rate-limit-limit";
/// Remaining calls in the current window.
pub const HEADER_RATE_REMAINING: &str = "x-rate-limit-remaining";
/// Seconds until the window resets.
pub const HEADER_RATE_RESET: &str = "x-rate-limit-reset";

/// Extra wait beyond the server-declared reset, absorbs clock skew.
pub const RATE_LIMIT_BUFFER: Duration = Duration::from_secs(1);

/// TCP connect timeout for the underlying HTTP client.
/// Requests themselves are bounded only by the caller's context.
pub const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by every request a [`super::Client`] makes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `https://api.exoclick.com/v2/`
    pub base_url: Url,
    /// Value of the `User-Agent` header
    pub user_agent: String,
    /// Safety margin added to rate-limit waits
    pub rate_limit_buffer: Duration,
    /// Connect timeout used when the client builds its own `reqwest::Client`
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Configuration pointing at `base_url`, all other fields defaulted.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|e| {
                panic!("FATAL: default base URL {DEFAULT_BASE_URL} does not parse: {e}")
            }),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit_buffer: RATE_LIMIT_BUFFER,
            connect_timeout: HTTP_CONNECT_TIMEOUT,
        }
    }
}

/// Parse a base URL, reporting failures as configuration errors.
pub fn parse_base_url(base_url: &str) -> ClientResult<Url> {
    Url::parse(base_url)
        .map_err(|e| ClientError::Configuration(format!("invalid base URL {base_url:?}: {e}")))
}
