//! Renderers turn a successful payload into region content.

pub mod candlestick;
mod chart;
mod dates;
mod indicators;
mod insights;

pub use chart::ChartRenderer;
pub use dates::DateListRenderer;
pub use indicators::{sma, vwap, IndicatorSpec, ParseIndicatorError};
pub use insights::{metric_title, InsightsRenderer, METRIC_ORDER};

use crate::models::{QueryRequest, ResultPayload};
use crate::ui::RegionContent;

/// Builds the region content for one payload type.
pub trait Renderer: Send + Sync {
    type Payload: ResultPayload;

    fn render(&self, payload: &Self::Payload, request: &QueryRequest) -> RegionContent;
}
