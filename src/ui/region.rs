//! Content of a form's output region.

use std::path::PathBuf;

use crate::models::{Candle, QueryRequest};

/// How a notice should stand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Alert,
}

/// A derived series drawn over the candles.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub name: String,
    /// One value per candle; `None` before the series has enough history.
    pub values: Vec<Option<f64>>,
}

/// A candlestick chart ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub title: String,
    pub candles: Vec<Candle>,
    pub overlays: Vec<Overlay>,
    /// Rows for the price pane.
    pub height: usize,
}

/// One metric card of the insights panel.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDisplay {
    pub key: String,
    pub title: String,
    pub median: String,
    pub average: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsightsView {
    pub title: String,
    pub metrics: Vec<MetricDisplay>,
}

/// Everything a region can show. Each render replaces the previous content.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionContent {
    /// Idle placeholder.
    Prompt(String),
    Loading(String),
    Notice { text: String, tone: Tone },
    /// Numbered dates the user can pick, with the selection that listed them.
    DateList {
        dates: Vec<String>,
        request: QueryRequest,
    },
    Chart(ChartView),
    ChartImage { title: String, path: PathBuf },
    Insights(InsightsView),
}

impl RegionContent {
    pub fn notice(text: impl Into<String>) -> Self {
        RegionContent::Notice {
            text: text.into(),
            tone: Tone::Plain,
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        RegionContent::Notice {
            text: text.into(),
            tone: Tone::Alert,
        }
    }

    /// Plain text of prompts, loading lines and notices.
    pub fn text(&self) -> Option<&str> {
        match self {
            RegionContent::Prompt(text)
            | RegionContent::Loading(text)
            | RegionContent::Notice { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RegionContent::Loading(_))
    }
}
