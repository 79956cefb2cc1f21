//! Response bodies of the dashboard API.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A 2xx body that the pipeline can classify as empty or not.
pub trait ResultPayload: DeserializeOwned + Send + Sync + 'static {
    /// Whether the result collection has nothing to render.
    fn is_empty(&self) -> bool;

    /// Server-supplied explanation accompanying an empty result.
    fn message(&self) -> Option<&str> {
        None
    }
}

/// Body of the date-list endpoints (gaps, events, earnings, valid dates).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatesPayload {
    pub dates: Vec<String>,
    pub message: Option<String>,
}

impl ResultPayload for DatesPayload {
    fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Intraday OHLCV columns for one ticker and day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartData {
    pub ticker: String,
    pub date: String,
    pub timestamp: Vec<String>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// `HH:MM` of the bar when the timestamp parses, the raw text otherwise.
    pub fn time_label(&self) -> String {
        let raw = self.timestamp.as_str();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return dt.format("%H:%M").to_string();
        }
        for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return dt.format("%H:%M").to_string();
            }
        }
        raw.to_string()
    }
}

impl ChartData {
    /// Zip the columns into bars. Columns shorter than `timestamp` truncate
    /// the series.
    pub fn candles(&self) -> Vec<Candle> {
        self.timestamp
            .iter()
            .zip(&self.open)
            .zip(&self.high)
            .zip(&self.low)
            .zip(&self.close)
            .enumerate()
            .map(|(i, ((((ts, open), high), low), close))| Candle {
                timestamp: ts.clone(),
                open: *open,
                high: *high,
                low: *low,
                close: *close,
                volume: self.volume.get(i).copied().unwrap_or(0.0),
            })
            .collect()
    }
}

/// Body of `/api/stock/chart`: either a series or a pre-rendered image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartPayload {
    pub chart_data: Option<ChartData>,
    /// `data:image/png;base64,...`
    pub chart: Option<String>,
    pub message: Option<String>,
}

impl ResultPayload for ChartPayload {
    fn is_empty(&self) -> bool {
        let no_series = self
            .chart_data
            .as_ref()
            .map_or(true, |data| data.timestamp.is_empty());
        let no_image = self.chart.as_deref().map_or(true, str::is_empty);
        no_series && no_image
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// One gap statistic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightStat {
    pub median: Value,
    pub average: Value,
    pub description: String,
}

/// Body of `/api/gap_insights`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsPayload {
    pub insights: BTreeMap<String, InsightStat>,
    pub message: Option<String>,
}

impl ResultPayload for InsightsPayload {
    fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Body of `/api/tickers`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TickersPayload {
    pub tickers: Vec<String>,
}

/// Body of `/api/years`. Years may arrive as numbers or strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct YearsPayload {
    pub years: Vec<Value>,
}

impl YearsPayload {
    pub fn labels(&self) -> Vec<String> {
        self.years.iter().map(display_value).collect()
    }
}

/// Body of `/api/economic_bins` and `/api/earnings_bins`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BinsPayload {
    pub bins: Vec<String>,
}

/// Render a JSON scalar the way it was supplied, without string quotes.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dates_payload_defaults() {
        let payload: DatesPayload =
            serde_json::from_str(r#"{"dates": [], "message": "No gaps found"}"#).unwrap();
        assert!(payload.is_empty());
        assert_eq!(ResultPayload::message(&payload), Some("No gaps found"));

        let bare: DatesPayload = serde_json::from_str("{}").unwrap();
        assert!(bare.is_empty());
        assert_eq!(ResultPayload::message(&bare), None);
    }

    #[test]
    fn test_chart_candles_zip_columns() {
        let payload: ChartPayload = serde_json::from_str(
            r#"{"chart_data": {
                "ticker": "AAPL", "date": "2024-03-04",
                "timestamp": ["2024-03-04 09:30:00", "2024-03-04T09:31:00"],
                "open": [1.0, 2.0], "high": [2.0, 3.0], "low": [0.5, 1.5],
                "close": [1.5, 1.8], "volume": [100, 200]
            }}"#,
        )
        .unwrap();
        assert!(!payload.is_empty());
        let candles = payload.chart_data.unwrap().candles();
        assert_eq!(candles.len(), 2);
        assert!(candles[0].is_bullish());
        assert!(!candles[1].is_bullish());
        assert_eq!(candles[0].time_label(), "09:30");
        assert_eq!(candles[1].time_label(), "09:31");
        assert_eq!(candles[1].volume, 200.0);
    }

    #[test]
    fn test_chart_payload_empty_series_or_image() {
        let empty: ChartPayload =
            serde_json::from_str(r#"{"chart_data": {"timestamp": []}}"#).unwrap();
        assert!(empty.is_empty());

        let image: ChartPayload =
            serde_json::from_str(r#"{"chart": "data:image/png;base64,AAAA"}"#).unwrap();
        assert!(!image.is_empty());
    }

    #[test]
    fn test_years_accept_numbers_and_strings() {
        let payload: YearsPayload = serde_json::from_str(r#"{"years": [2023, "2024"]}"#).unwrap();
        assert_eq!(payload.labels(), vec!["2023", "2024"]);
    }
}
