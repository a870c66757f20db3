//! Header-driven rate gating
//!
//! The API reports a budget per traffic category on every response
//! (`x-rate-limit-limit`, `x-rate-limit-remaining`, `x-rate-limit-reset`).
//! [`RateGate`] stores the last reported budget and holds back requests of an
//! exhausted category until the window resets.

use reqwest::header::HeaderMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::config::{HEADER_RATE_LIMIT, HEADER_RATE_REMAINING, HEADER_RATE_RESET};
use crate::context::{Cancellation, RequestContext};
use crate::metrics;

/// Class of API paths sharing one rate budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficCategory {
    /// Everything except the statistics export
    Core,
    /// `statistics/...` endpoints
    Statistics,
}

impl TrafficCategory {
    /// All categories, in budget-slot order
    pub const ALL: [TrafficCategory; 2] = [TrafficCategory::Core, TrafficCategory::Statistics];

    /// Classify a request path. Deterministic and independent of any request object.
    pub fn classify(path: &str) -> Self {
        if path.contains("/statistics/") {
            TrafficCategory::Statistics
        } else {
            TrafficCategory::Core
        }
    }

    /// Label used in logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficCategory::Core => "core",
            TrafficCategory::Statistics => "statistics",
        }
    }

    fn slot(self) -> usize {
        match self {
            TrafficCategory::Core => 0,
            TrafficCategory::Statistics => 1,
        }
    }
}

impl fmt::Display for TrafficCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last budget reported by the server for one category.
///
/// Unset fields impose no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateBudget {
    /// Calls allowed per window
    pub limit: Option<u32>,
    /// Calls left in the current window
    pub remaining: Option<u32>,
    /// When the window resets
    pub reset: Option<Instant>,
}

impl RateBudget {
    /// Build a budget from response headers. Missing or unparsable values stay unset.
    pub fn from_headers(headers: &HeaderMap, now: Instant) -> Self {
        let reset = parse_header(headers, HEADER_RATE_RESET)
            .filter(|secs| *secs != 0)
            .map(|secs| now + Duration::from_secs(u64::from(secs)));

        Self {
            limit: parse_header(headers, HEADER_RATE_LIMIT),
            remaining: parse_header(headers, HEADER_RATE_REMAINING),
            reset,
        }
    }

    /// Whether the budget is spent and its window has not reset yet
    pub fn is_exhausted(&self, now: Instant) -> bool {
        matches!((self.remaining, self.reset), (Some(0), Some(reset)) if now < reset)
    }
}

impl fmt::Display for RateBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<u32>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        write!(f, "{}/{}", show(self.remaining), show(self.limit))?;
        if let Some(reset) = self.reset {
            let left = reset.saturating_duration_since(Instant::now());
            write!(f, " (reset in {}s)", left.as_secs())?;
        }
        Ok(())
    }
}

fn parse_header(headers: &HeaderMap, name: &str) -> Option<u32> {
    let raw = headers.get(name)?.to_str().ok()?;
    match raw.trim().parse::<u32>() {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Ignoring unparsable header {}='{}': {}", name, raw, e);
            None
        }
    }
}

/// Outcome of consulting the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Send now
    Proceed,
    /// Hold the request until this instant
    WaitUntil(Instant),
}

/// Per-category budget tracker shared by all requests of one client
#[derive(Debug)]
pub struct RateGate {
    budgets: [Mutex<RateBudget>; 2],
    buffer: Duration,
}

impl RateGate {
    /// Create a gate with every category unconstrained
    pub fn new(buffer: Duration) -> Self {
        Self {
            budgets: Default::default(),
            buffer,
        }
    }

    /// Safety buffer added after each reset instant
    pub fn buffer(&self) -> Duration {
        self.buffer
    }

    fn lock(&self, category: TrafficCategory) -> MutexGuard<'_, RateBudget> {
        self.budgets[category.slot()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Current budget for `category`
    pub fn budget(&self, category: TrafficCategory) -> RateBudget {
        *self.lock(category)
    }

    /// Decide whether a request in `category` may go out at `now`.
    ///
    /// A spent budget stays closed until its reset plus the safety buffer.
    pub fn admit(&self, category: TrafficCategory, now: Instant) -> Admission {
        let budget = self.lock(category);
        match (budget.remaining, budget.reset) {
            (Some(0), Some(reset)) if now < reset + self.buffer => {
                Admission::WaitUntil(reset + self.buffer)
            }
            _ => Admission::Proceed,
        }
    }

    /// Overwrite the budget of `category` from response headers
    pub fn record_response(&self, category: TrafficCategory, headers: &HeaderMap, now: Instant) {
        let budget = RateBudget::from_headers(headers, now);
        *self.lock(category) = budget;

        metrics::record_rate_budget(category, &budget);
        debug!(category = %category, budget = %budget, "Rate budget updated");
    }

    /// Suspend until `category` is admitted or `ctx` ends
    pub async fn wait(
        &self,
        category: TrafficCategory,
        ctx: &RequestContext,
    ) -> Result<(), Cancellation> {
        let started = Instant::now();
        let Admission::WaitUntil(deadline) = self.admit(category, started) else {
            return Ok(());
        };

        let wait = deadline.saturating_duration_since(started);
        warn!(
            category = %category,
            wait_ms = wait.as_millis(),
            "Rate budget exhausted, holding request until reset"
        );

        ctx.run(tokio::time::sleep_until(deadline)).await?;
        metrics::record_rate_gate_wait(category, started.elapsed());
        Ok(())
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(super::config::RATE_LIMIT_BUFFER)
    }
}
