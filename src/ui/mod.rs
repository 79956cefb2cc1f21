//! In-memory form model and its terminal presentation.

mod form;
pub mod messages;
pub mod present;
mod region;

pub use form::{FormHandle, FormView};
pub use region::{ChartView, InsightsView, MetricDisplay, Overlay, RegionContent, Tone};
