//! Request, rate-gate and login metrics
//!
//! Emission goes through the `metrics` facade and is a no-op until a recorder
//! is installed. [`init_metrics`] installs a Prometheus exporter with a scrape
//! endpoint; the CLI calls it when `--metrics-addr` is given.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use reqwest::{Method, StatusCode};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::client::{RateBudget, TrafficCategory};

static METRICS_INITIALIZED: OnceCell<()> = OnceCell::new();

static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Install the Prometheus exporter listening on `addr`.
///
/// Idempotent: later calls return `Ok(())` without reinstalling.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    METRICS_INITIALIZED
        .get_or_try_init(|| {
            info!("Initializing metrics exporter on {}", addr);

            PrometheusBuilder::new()
                .with_http_listener(addr)
                .install()
                .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

            describe_counter!(
                "http_requests_total",
                Unit::Count,
                "Total number of HTTP requests sent to the API"
            );
            describe_histogram!(
                "http_request_duration_seconds",
                Unit::Seconds,
                "HTTP request duration in seconds"
            );
            describe_gauge!(
                "rate_budget_remaining",
                Unit::Count,
                "Remaining calls reported by the server per traffic category"
            );
            describe_histogram!(
                "rate_gate_wait_seconds",
                Unit::Seconds,
                "Time requests spent held by the rate gate"
            );
            describe_counter!(
                "auth_logins_total",
                Unit::Count,
                "Token exchanges performed, by outcome"
            );

            Ok(())
        })
        .map(|_| ())
}

/// Whether [`init_metrics`] has succeeded
pub fn is_initialized() -> bool {
    METRICS_INITIALIZED.get().is_some()
}

/// Generate a new correlation ID for request tracing
pub fn generate_correlation_id() -> String {
    let id = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("req-{id:08x}")
}

/// Timing and outcome of one HTTP request
pub struct HttpRequestMetrics {
    category: TrafficCategory,
    method: Method,
    start_time: Instant,
    correlation_id: String,
}

impl HttpRequestMetrics {
    /// Start recording a new request
    pub fn start(category: TrafficCategory, method: &Method) -> Self {
        let correlation_id = generate_correlation_id();

        debug!(
            correlation_id = %correlation_id,
            category = %category,
            method = %method,
            "Starting HTTP request"
        );

        Self {
            category,
            method: method.clone(),
            start_time: Instant::now(),
            correlation_id,
        }
    }

    fn record(&self, status: String) -> Duration {
        let duration = self.start_time.elapsed();

        counter!(
            "http_requests_total",
            "category" => self.category.as_str(),
            "method" => self.method.to_string(),
            "status" => status,
        )
        .increment(1);

        histogram!(
            "http_request_duration_seconds",
            "category" => self.category.as_str(),
        )
        .record(duration.as_secs_f64());

        duration
    }

    /// Record a response
    pub fn record_complete(&self, status: StatusCode) {
        let duration = self.record(status.as_u16().to_string());

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(
                correlation_id = %self.correlation_id,
                category = %self.category,
                duration_ms = duration.as_millis(),
                "Rate limit error (429) received"
            );
        }

        debug!(
            correlation_id = %self.correlation_id,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "HTTP request completed"
        );
    }

    /// Record a network error (no status code)
    pub fn record_network_error(&self) {
        let duration = self.record("network_error".to_string());

        warn!(
            correlation_id = %self.correlation_id,
            category = %self.category,
            duration_ms = duration.as_millis(),
            "Network error recorded"
        );
    }

    /// Record a request abandoned because its context ended
    pub fn record_cancelled(&self) {
        let duration = self.record("cancelled".to_string());

        debug!(
            correlation_id = %self.correlation_id,
            duration_ms = duration.as_millis(),
            "HTTP request cancelled"
        );
    }

    /// Correlation ID of this request
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Publish the budget last reported for `category`
pub fn record_rate_budget(category: TrafficCategory, budget: &RateBudget) {
    if let Some(remaining) = budget.remaining {
        gauge!("rate_budget_remaining", "category" => category.as_str()).set(f64::from(remaining));
    }
}

/// Record time a request spent held by the rate gate
pub fn record_rate_gate_wait(category: TrafficCategory, waited: Duration) {
    histogram!("rate_gate_wait_seconds", "category" => category.as_str())
        .record(waited.as_secs_f64());
}

/// Count a token exchange
pub fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("auth_logins_total", "outcome" => outcome).increment(1);
}
