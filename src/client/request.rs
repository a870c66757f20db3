//! Request construction
//!
//! Every API request starts from [`super::Client::new_request`], which resolves
//! the path against the configured base URL and stamps the client headers.

use reqwest::header::{HeaderName, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Request;
use serde::{Deserialize, Serialize};

use super::{ClientError, ClientResult};

/// Offset/limit pair accepted by every list endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Maximum number of rows to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Rows to skip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

impl ListOptions {
    /// Page of `limit` rows starting at `offset`
    pub fn page(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

/// Builder for a single API request
#[derive(Debug)]
pub struct RequestBuilder {
    inner: reqwest::RequestBuilder,
}

impl RequestBuilder {
    pub(super) fn new(inner: reqwest::RequestBuilder, user_agent: &str) -> Self {
        Self {
            inner: inner.header(USER_AGENT, user_agent),
        }
    }

    /// Serialize `body` as the JSON request body
    pub fn json<B>(mut self, body: &B) -> Self
    where
        B: Serialize + ?Sized,
    {
        self.inner = self.inner.json(body);
        self
    }

    /// Encode `options` as the query string. `None` leaves the URL untouched.
    pub fn query<Q>(mut self, options: Option<&Q>) -> Self
    where
        Q: Serialize + ?Sized,
    {
        if let Some(options) = options {
            self.inner = self.inner.query(options);
        }
        self
    }

    /// Set an extra header
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.inner = self.inner.header(name, value);
        self
    }

    /// Ask for a CSV response
    pub fn accept_csv(self) -> Self {
        self.header(ACCEPT, HeaderValue::from_static("text/csv"))
    }

    /// Finish the request. Body or query serialization failures surface here.
    pub fn build(self) -> ClientResult<Request> {
        self.inner
            .build()
            .map_err(|e| ClientError::Encode(e.to_string()))
    }
}

/// Check the base URL invariant: its path must end with `/`
pub(super) fn ensure_trailing_slash(base_url: &reqwest::Url) -> ClientResult<()> {
    if base_url.path().ends_with('/') {
        Ok(())
    } else {
        Err(ClientError::Configuration(format!(
            "base URL must have a trailing slash, but {:?} does not",
            base_url.as_str()
        )))
    }
}
