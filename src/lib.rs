//! # ExoClick API client
//!
//! Async client for the ExoClick advertising API. Every call goes through
//! one request pipeline that logs in on demand, keeps each traffic category
//! within the budget the server reports, and maps failures to typed errors.
//! The statistics export is validated before it is sent and its CSV body is
//! decoded into typed records.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use exoclick::statistics::{StatisticsField, StatisticsQuery};
//! use exoclick::{Client, RequestContext};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("my-api-token")?;
//! let ctx = RequestContext::with_timeout(Duration::from_secs(30));
//!
//! let query = StatisticsQuery::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
//!     vec![StatisticsField::Date, StatisticsField::Impressions, StatisticsField::Cost],
//! )
//! .group_by(StatisticsField::Date);
//!
//! for row in client.statistics().fetch(&ctx, &query).await? {
//!     println!("{:?} {} {}", row.date, row.impressions, row.cost);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`context`] - Cancellation and deadlines for in-flight calls
//! - [`client`] - Request building, login, rate gating and dispatch
//! - [`statistics`] - Statistics query validation and CSV decoding
//! - [`resources`] - Campaign, category, file and marketplace endpoints
//! - [`output`] - CSV writers for decoded statistics
//! - [`metrics`] - Prometheus metrics for requests, rate gating and logins

#![warn(missing_docs)]
#![warn(clippy::all)]

/// CLI command implementations
pub mod cli;

/// API client and request pipeline
pub mod client;

/// Cancellation and deadlines
pub mod context;

/// Request, rate-gate and login metrics
pub mod metrics;

/// Statistics output writers
pub mod output;

/// Per-resource endpoints
pub mod resources;

/// Statistics export
pub mod statistics;

pub use client::{Client, ClientBuilder, ClientConfig, ClientError, ClientResult, TrafficCategory};
pub use context::{Cancellation, RequestContext};
pub use statistics::{StatisticRecord, StatisticsField, StatisticsQuery};
