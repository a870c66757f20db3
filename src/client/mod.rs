//! API client and request pipeline
//!
//! # Overview
//!
//! [`Client`] is the shared state every API call goes through:
//!
//! 1. **Request building**: [`Client::new_request`] resolves a path against the
//!    base URL ([`request`])
//! 2. **Authentication**: a bearer token is obtained and refreshed on demand
//!    ([`auth::TokenAuthority`])
//! 3. **Rate gating**: requests wait while the server-reported budget of their
//!    traffic category is exhausted ([`rate_limit::RateGate`])
//! 4. **Dispatch and error mapping**: [`Client::bare_do`] ([`transport`])
//!
//! The client is cheap to clone; clones share the token and the rate budgets.
//!
//! # Quick Start
//!
//! ```no_run
//! use exoclick::{Client, RequestContext};
//! use exoclick::resources::CampaignListOptions;
//!
//! # async fn example() -> Result<(), exoclick::ClientError> {
//! let client = Client::new("my-api-token")?;
//! let ctx = RequestContext::new();
//! let campaigns = client.campaigns().list(&ctx, &CampaignListOptions::default()).await?;
//! println!("{} campaigns", campaigns.len());
//! # Ok(())
//! # }
//! ```

use reqwest::Method;
use std::sync::Arc;

use crate::context::Cancellation;
use crate::resources::{CampaignsService, CategoriesService, FilesService, MarketplaceService};
use crate::statistics::{DecodeError, StatisticsService, ValidationError};

pub mod auth;
pub mod config;
pub mod rate_limit;
pub mod request;
pub mod transport;

pub use auth::{AuthToken, TokenAuthority};
pub use config::ClientConfig;
pub use rate_limit::{Admission, RateBudget, RateGate, TrafficCategory};
pub use request::{ListOptions, RequestBuilder};
pub use transport::ErrorResponse;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration, not retried
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Token exchange failed
    #[error("authentication error: {0}")]
    Auth(String),

    /// Context cancelled or deadline exceeded
    #[error("cancelled: {0}")]
    Cancelled(#[from] Cancellation),

    /// Network-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response with a structured message
    #[error("API error: {0}")]
    Api(ErrorResponse),

    /// Non-2xx response whose body is not the expected error shape
    #[error("failed to parse error response (status {status}): {body}")]
    MalformedErrorResponse {
        /// HTTP status
        status: u16,
        /// Raw body
        body: String,
    },

    /// Statistics export could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Success body is not the expected JSON
    #[error("failed to decode JSON response: {0}")]
    Json(String),

    /// Query rejected before sending
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Request body or query could not be serialized
    #[error("encode error: {0}")]
    Encode(String),

    /// Argument rejected before sending
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ClientError {
    /// Whether this error came from the caller's context ending
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled(_))
    }

    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api(response) => Some(response.status.as_u16()),
            ClientError::MalformedErrorResponse { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug)]
struct ClientState {
    http: reqwest::Client,
    config: ClientConfig,
    auth: TokenAuthority,
    rate_gate: RateGate,
}

/// Shared handle to the API
#[derive(Debug, Clone)]
pub struct Client {
    state: Arc<ClientState>,
}

impl Client {
    /// Client against the default base URL
    pub fn new(api_token: impl Into<String>) -> ClientResult<Self> {
        Self::builder(api_token).build()
    }

    /// Start configuring a client
    pub fn builder(api_token: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            api_token: api_token.into(),
            config: ClientConfig::default(),
            http: None,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ClientConfig {
        &self.state.config
    }

    /// Token holder of this client
    pub fn token_authority(&self) -> &TokenAuthority {
        &self.state.auth
    }

    /// Last reported budget of `category`
    pub fn rate_budget(&self, category: TrafficCategory) -> RateBudget {
        self.state.rate_gate.budget(category)
    }

    /// Start a request for `path`, relative to the base URL.
    ///
    /// Fails when the base URL path lacks its trailing slash.
    pub fn new_request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let base = &self.state.config.base_url;
        request::ensure_trailing_slash(base)?;

        let url = base
            .join(path)
            .map_err(|e| ClientError::Configuration(format!("invalid request path {path:?}: {e}")))?;

        Ok(RequestBuilder::new(
            self.state.http.request(method, url),
            &self.state.config.user_agent,
        ))
    }

    /// Statistics export
    pub fn statistics(&self) -> StatisticsService<'_> {
        StatisticsService::new(self)
    }

    /// Campaign endpoints
    pub fn campaigns(&self) -> CampaignsService<'_> {
        CampaignsService::new(self)
    }

    /// Category collection
    pub fn categories(&self) -> CategoriesService<'_> {
        CategoriesService::new(self)
    }

    /// Creative library
    pub fn files(&self) -> FilesService<'_> {
        FilesService::new(self)
    }

    /// Marketplace listings
    pub fn marketplace(&self) -> MarketplaceService<'_> {
        MarketplaceService::new(self)
    }
}

/// Builder for [`Client`]
#[derive(Debug)]
pub struct ClientBuilder {
    api_token: String,
    config: ClientConfig,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Replace the whole configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// API root; keep the trailing slash
    pub fn base_url(mut self, base_url: &str) -> ClientResult<Self> {
        self.config.base_url = config::parse_base_url(base_url)?;
        Ok(self)
    }

    /// Override the `User-Agent` header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Safety margin added to rate-limit waits
    pub fn rate_limit_buffer(mut self, buffer: std::time::Duration) -> Self {
        self.config.rate_limit_buffer = buffer;
        self
    }

    /// Use a pre-built HTTP client instead of creating one
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the client
    pub fn build(self) -> ClientResult<Client> {
        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .connect_timeout(self.config.connect_timeout)
                .build()
                .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?,
        };

        let login_url = self
            .config
            .base_url
            .join(config::LOGIN_PATH)
            .map_err(|e| ClientError::Configuration(format!("invalid login URL: {e}")))?;

        let auth = TokenAuthority::new(
            http.clone(),
            login_url,
            self.api_token,
            self.config.user_agent.clone(),
        );
        let rate_gate = RateGate::new(self.config.rate_limit_buffer);

        Ok(Client {
            state: Arc::new(ClientState {
                http,
                config: self.config,
                auth,
                rate_gate,
            }),
        })
    }
}
