//! Indicator series drawn over the candles.

use std::fmt;
use std::str::FromStr;

use crate::models::Candle;
use crate::ui::Overlay;

/// An overlay requested in configuration, e.g. `"vwap"` or `"sma:20"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorSpec {
    Sma(usize),
    Vwap,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown indicator '{0}', expected 'vwap' or 'sma:N'")]
pub struct ParseIndicatorError(String);

impl FromStr for IndicatorSpec {
    type Err = ParseIndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        if normalized == "vwap" {
            return Ok(IndicatorSpec::Vwap);
        }
        normalized
            .strip_prefix("sma:")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .map(IndicatorSpec::Sma)
            .ok_or_else(|| ParseIndicatorError(s.to_string()))
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorSpec::Sma(period) => write!(f, "SMA({})", period),
            IndicatorSpec::Vwap => f.write_str("VWAP"),
        }
    }
}

impl IndicatorSpec {
    pub fn compute(&self, candles: &[Candle]) -> Overlay {
        let values = match self {
            IndicatorSpec::Sma(period) => sma(candles, *period),
            IndicatorSpec::Vwap => vwap(candles),
        };
        Overlay {
            name: self.to_string(),
            values,
        }
    }
}

/// Simple moving average of closes.
pub fn sma(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; candles.len()];
    }
    let mut sum = 0.0;
    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            sum += candle.close;
            if i >= period {
                sum -= candles[i - period].close;
            }
            (i + 1 >= period).then(|| sum / period as f64)
        })
        .collect()
}

/// Volume-weighted average of the typical price since the first bar.
pub fn vwap(candles: &[Candle]) -> Vec<Option<f64>> {
    let mut price_volume = 0.0;
    let mut volume = 0.0;
    candles
        .iter()
        .map(|candle| {
            let typical = (candle.high + candle.low + candle.close) / 3.0;
            price_volume += typical * candle.volume;
            volume += candle.volume;
            (volume > 0.0).then(|| price_volume / volume)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(close: f64, volume: f64) -> Candle {
        Candle {
            timestamp: String::new(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("vwap".parse::<IndicatorSpec>(), Ok(IndicatorSpec::Vwap));
        assert_eq!(" SMA:20 ".parse::<IndicatorSpec>(), Ok(IndicatorSpec::Sma(20)));
        assert!("sma:0".parse::<IndicatorSpec>().is_err());
        assert!("ema:9".parse::<IndicatorSpec>().is_err());
    }

    #[test]
    fn test_sma_window() {
        let candles: Vec<_> = [1.0, 2.0, 3.0, 4.0].iter().map(|c| candle(*c, 1.0)).collect();
        assert_eq!(sma(&candles, 2), vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn test_vwap_weights_volume() {
        let candles = vec![candle(10.0, 0.0), candle(10.0, 100.0), candle(20.0, 300.0)];
        let values = vwap(&candles);
        assert_eq!(values[0], None);
        assert_eq!(values[1], Some(10.0));
        assert_eq!(values[2], Some(17.5));
    }
}
