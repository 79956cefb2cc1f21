use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::models::{ChartData, ChartPayload, QueryRequest};
use crate::ui::{ChartView, RegionContent};

use super::{IndicatorSpec, Renderer};

/// Candlestick chart with volume and indicator overlays.
///
/// Image payloads are saved under `image_dir` and shown by path.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    indicators: Vec<IndicatorSpec>,
    height: usize,
    image_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(indicators: Vec<IndicatorSpec>, height: usize, image_dir: PathBuf) -> Self {
        Self {
            indicators,
            height,
            image_dir,
        }
    }

    fn series_view(&self, data: &ChartData) -> ChartView {
        let candles = data.candles();
        let overlays = self
            .indicators
            .iter()
            .map(|indicator| indicator.compute(&candles))
            .collect();
        ChartView {
            title: format!("{} Candlestick Chart - {}", data.ticker, data.date),
            candles,
            overlays,
            height: self.height,
        }
    }

    fn save_image(&self, data_url: &str, ticker: &str, date: &str) -> Result<PathBuf, String> {
        let encoded = data_url
            .split_once(";base64,")
            .map(|(_, data)| data)
            .unwrap_or(data_url);
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| format!("invalid chart image: {}", e))?;

        fs::create_dir_all(&self.image_dir)
            .map_err(|e| format!("cannot create {}: {}", self.image_dir.display(), e))?;
        let path = image_path(&self.image_dir, ticker, date);
        fs::write(&path, bytes).map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
        debug!("Saved chart image to {}", path.display());
        Ok(path)
    }
}

/// Where the image for a ticker and date is stored.
pub fn image_path(dir: &Path, ticker: &str, date: &str) -> PathBuf {
    let clean = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    };
    dir.join(format!("{}_{}.png", clean(ticker), clean(date)))
}

impl Renderer for ChartRenderer {
    type Payload = ChartPayload;

    fn render(&self, payload: &ChartPayload, request: &QueryRequest) -> RegionContent {
        if let Some(data) = payload.chart_data.as_ref().filter(|d| !d.timestamp.is_empty()) {
            return RegionContent::Chart(self.series_view(data));
        }

        let ticker = request.value("ticker").unwrap_or_default();
        let date = request.value("date").unwrap_or_default();
        let Some(data_url) = payload.chart.as_deref() else {
            return RegionContent::notice("No data available for the selected date. Try another date.");
        };

        match self.save_image(data_url, ticker, date) {
            Ok(path) => RegionContent::ChartImage {
                title: format!("{} Candlestick Chart - {}", ticker, date),
                path,
            },
            Err(e) => {
                warn!("Failed to save chart image: {}", e);
                RegionContent::alert(format!("Failed to save chart image: {}", e))
            }
        }
    }
}
