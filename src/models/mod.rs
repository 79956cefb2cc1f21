//! Data models for requests, outcomes and API payloads.

mod payload;
mod query;

pub use payload::{
    display_value, BinsPayload, Candle, ChartData, ChartPayload, DatesPayload, InsightStat,
    InsightsPayload, ResultPayload, TickersPayload, YearsPayload,
};
pub use query::{OutcomeKind, QueryOutcome, QueryRequest};
