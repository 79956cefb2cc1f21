//! gapchart - terminal client for the market gap dashboard.
//!
//! Pick a ticker and date, or a gap, economic event or earnings filter, and
//! get a candlestick chart and the list of matching dates from the
//! dashboard API. Every query runs through one fetch-render [`pipeline`]
//! guarded by a per-action [`rate_limit`] gate that remembers server
//! throttling across restarts.

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod http_client;
pub mod models;
pub mod options;
pub mod pipeline;
pub mod rate_limit;
pub mod render;
pub mod ui;

pub use dashboard::{Dashboard, EventFilter, Query};
pub use models::{OutcomeKind, QueryOutcome, QueryRequest};
