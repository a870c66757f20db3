//! Bearer token management
//!
//! The API trades a static API key for a short-lived bearer token via
//! `POST login`. [`TokenAuthority`] owns the current token and refreshes it on
//! demand, with at most one login in flight per client.

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client as HttpClient, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{ClientError, ClientResult};
use crate::context::RequestContext;
use crate::metrics;

#[derive(Serialize)]
struct LoginRequest<'a> {
    api_token: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    expires_in: i64,
}

/// Bearer token and its expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken {
    token: String,
    expires_in: i64,
    expires_at: Instant,
}

impl AuthToken {
    fn issued(response: LoginResponse, now: Instant) -> ClientResult<Self> {
        let lifetime = Duration::from_secs(u64::try_from(response.expires_in).unwrap_or(0));
        let expires_at = now.checked_add(lifetime).ok_or_else(|| {
            ClientError::Auth(format!(
                "malformed login response: expires_in {} out of range",
                response.expires_in
            ))
        })?;
        Ok(Self {
            token: response.token,
            expires_in: response.expires_in,
            expires_at,
        })
    }

    /// The bearer credential
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Lifetime granted by the server, in seconds
    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }

    /// Instant at which the token stops being used
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// A token is expired once `now` reaches its expiry
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Holds the bearer token of one client and performs logins
pub struct TokenAuthority {
    http: HttpClient,
    login_url: Url,
    api_token: String,
    user_agent: String,
    // Held across the login so concurrent callers share one refresh.
    current: Mutex<Option<AuthToken>>,
}

impl fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("login_url", &self.login_url.as_str())
            .field("api_token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    /// Create an authority that logs in at `login_url` with `api_token`
    pub fn new(
        http: HttpClient,
        login_url: Url,
        api_token: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            http,
            login_url,
            api_token: api_token.into(),
            user_agent: user_agent.into(),
            current: Mutex::new(None),
        }
    }

    /// Endpoint used for the token exchange
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// Snapshot of the held token, if any
    pub async fn current(&self) -> Option<AuthToken> {
        self.current.lock().await.clone()
    }

    /// Return a valid bearer token, logging in first if the held one has expired.
    ///
    /// A failed login leaves the previous state untouched so the next call retries.
    pub async fn ensure_valid(&self, ctx: &RequestContext) -> ClientResult<String> {
        let mut current = ctx.run(self.current.lock()).await?;

        if let Some(token) = current.as_ref().filter(|t| !t.is_expired(Instant::now())) {
            return Ok(token.token.clone());
        }

        debug!("Bearer token missing or expired, logging in");
        let fresh = match ctx.run(self.login()).await? {
            Ok(token) => token,
            Err(e) => {
                metrics::record_login(false);
                warn!("Login failed: {}", e);
                return Err(e);
            }
        };

        metrics::record_login(true);
        info!(expires_in = fresh.expires_in, "Obtained bearer token");

        let token = fresh.token.clone();
        *current = Some(fresh);
        Ok(token)
    }

    async fn login(&self) -> ClientResult<AuthToken> {
        let body = serde_json::to_vec(&LoginRequest {
            api_token: &self.api_token,
        })
        .map_err(|e| ClientError::Auth(format!("failed to encode login request: {e}")))?;

        let response = self
            .http
            .post(self.login_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, self.user_agent.as_str())
            .body(body)
            .send()
            .await
            .map_err(|e| ClientError::Auth(format!("login request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::Auth(format!(
                "authentication failed with status {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Auth(format!("failed to read login response: {e}")))?;
        let now = Instant::now();

        let parsed: LoginResponse = serde_json::from_slice(&body)
            .map_err(|e| ClientError::Auth(format!("malformed login response: {e}")))?;

        AuthToken::issued(parsed, now)
    }
}
