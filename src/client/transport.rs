//! Authenticated, rate-gated request dispatch

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, Request, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::config::LOGIN_PATH;
use super::rate_limit::TrafficCategory;
use super::{Client, ClientError, ClientResult};
use crate::context::RequestContext;
use crate::metrics::HttpRequestMetrics;

/// Structured error returned by the API for a non-2xx response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// HTTP status of the response
    pub status: StatusCode,
    /// `message` field of the error body
    pub message: String,
    /// Method of the failed request
    pub method: Method,
    /// URL of the failed request
    pub url: Url,
    /// Raw response body, kept readable for the caller
    pub body: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {} {}",
            self.method,
            self.url,
            self.status.as_u16(),
            self.message
        )
    }
}

impl std::error::Error for ErrorResponse {}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn is_login(url: &Url) -> bool {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .is_some_and(|last| last == LOGIN_PATH)
}

impl Client {
    /// Send `request` through the full pipeline and return the raw response.
    ///
    /// Attaches the bearer token (except for the login call), waits on the rate
    /// gate, sends, records the reported budget and turns non-2xx responses
    /// into [`ClientError::Api`].
    pub async fn bare_do(&self, ctx: &RequestContext, mut request: Request) -> ClientResult<Response> {
        ctx.check()?;

        let method = request.method().clone();
        let url = request.url().clone();
        let category = TrafficCategory::classify(url.path());

        if !is_login(&url) {
            let token = self.state.auth.ensure_valid(ctx).await?;
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ClientError::Auth(format!("token is not a valid header value: {e}")))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        self.state.rate_gate.wait(category, ctx).await?;

        debug!(method = %method, path = url.path(), category = %category, "Sending request");
        let metrics = HttpRequestMetrics::start(category, &method);

        let response = match ctx.run(self.state.http.execute(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                metrics.record_network_error();
                // A transport failure caused by the context ending reports the cancellation.
                if let Some(reason) = ctx.err() {
                    return Err(reason.into());
                }
                return Err(ClientError::Transport(e.to_string()));
            }
            Err(reason) => {
                metrics.record_cancelled();
                return Err(reason.into());
            }
        };

        metrics.record_complete(response.status());
        self.state
            .rate_gate
            .record_response(category, response.headers(), Instant::now());

        check_response(ctx, method, response).await
    }

    /// Send `request` and decode the JSON response body into `T`
    pub async fn do_json<T>(&self, ctx: &RequestContext, request: Request) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.bare_do(ctx, request).await?;
        let body = read_body(ctx, response).await?;

        serde_json::from_slice(&body).map_err(|e| ClientError::Json(e.to_string()))
    }

    /// Send `request` and discard the response body
    pub async fn do_empty(&self, ctx: &RequestContext, request: Request) -> ClientResult<()> {
        let response = self.bare_do(ctx, request).await?;
        read_body(ctx, response).await?;
        Ok(())
    }
}

/// Read a whole response body, honouring cancellation
pub(crate) async fn read_body(ctx: &RequestContext, response: Response) -> ClientResult<Vec<u8>> {
    let body = ctx
        .run(response.bytes())
        .await?
        .map_err(|e| ClientError::Transport(format!("failed to read response body: {e}")))?;
    Ok(body.to_vec())
}

/// Pass 2xx responses through, convert everything else into an error
async fn check_response(
    ctx: &RequestContext,
    method: Method,
    response: Response,
) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = read_body(ctx, response).await?;
    let body = String::from_utf8_lossy(&body).into_owned();

    warn!(method = %method, url = %url, status = status.as_u16(), "API returned an error");

    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => Err(ClientError::Api(ErrorResponse {
            status,
            message: parsed.message,
            method,
            url,
            body,
        })),
        Err(_) => Err(ClientError::MalformedErrorResponse {
            status: status.as_u16(),
            body,
        }),
    }
}
