//! Text candlestick chart.
//!
//! The price pane is drawn top to bottom, one character per candle per row.
//! Each cell is the upper wick, body or lower wick glyph depending on where
//! the row falls between high, body and low. Quarter-row thresholds pick
//! half glyphs so bodies and wicks end between rows.
//!
//! A volume strip of block characters sits under the price pane and a row
//! of time labels closes the chart.

use crate::models::Candle;
use crate::ui::{ChartView, Overlay};

const VOID: char = ' ';
const BODY: char = '┃';
const HALF_BODY_BOTTOM: char = '╻';
const HALF_BODY_TOP: char = '╹';
const WICK: char = '│';
const BODY_TO_WICK_TOP: char = '╽';
const BODY_TO_WICK_BOTTOM: char = '╿';
const UPPER_WICK: char = '╷';
const LOWER_WICK: char = '╵';

const OVERLAY_MARKS: [char; 3] = ['•', '∘', '×'];
const VOLUME_BLOCKS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Rows of the volume strip.
pub const VOLUME_ROWS: usize = 3;
/// Width of the axis column, separator included.
pub const AXIS_WIDTH: usize = 13;

/// Colour class of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphTone {
    Blank,
    Bullish,
    Bearish,
    /// Index into the chart's overlays.
    Overlay(usize),
    Volume,
    Axis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub tone: GlyphTone,
}

impl Glyph {
    const BLANK: Glyph = Glyph {
        ch: VOID,
        tone: GlyphTone::Blank,
    };
}

/// One output line: the axis label and the plot cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub axis: String,
    pub cells: Vec<Glyph>,
}

impl ChartRow {
    /// The row without styling, trailing blanks trimmed.
    pub fn plain(&self) -> String {
        let mut line = self.axis.clone();
        line.extend(self.cells.iter().map(|g| g.ch));
        line.trim_end().to_string()
    }
}

/// Marker character for an overlay index.
pub fn overlay_mark(index: usize) -> char {
    OVERLAY_MARKS[index % OVERLAY_MARKS.len()]
}

struct PricePane<'a> {
    candles: &'a [Candle],
    overlays: Vec<(usize, &'a [Option<f64>])>,
    min_price: f64,
    max_price: f64,
    height: usize,
}

impl<'a> PricePane<'a> {
    fn new(candles: &'a [Candle], overlays: Vec<(usize, &'a [Option<f64>])>, height: usize) -> Self {
        let high = candles.iter().fold(f64::NEG_INFINITY, |acc, c| acc.max(c.high));
        let low = candles.iter().fold(f64::INFINITY, |acc, c| acc.min(c.low));
        let margin = (high - low) * 0.02;
        Self {
            candles,
            overlays,
            min_price: (low - margin).max(0.0),
            max_price: high + margin,
            height,
        }
    }

    fn to_height(&self, price: f64) -> f64 {
        if self.max_price == self.min_price {
            return self.height as f64 / 2.0;
        }
        (price - self.min_price) / (self.max_price - self.min_price) * self.height as f64
    }

    fn candle_glyph(&self, candle: &Candle, row: usize) -> char {
        let y = row as f64;
        let high = self.to_height(candle.high);
        let low = self.to_height(candle.low);
        let top = self.to_height(candle.open.max(candle.close));
        let bottom = self.to_height(candle.open.min(candle.close));

        if high.ceil() >= y && y >= top.floor() {
            if top - y > 0.75 {
                BODY
            } else if top - y > 0.25 {
                if high - y > 0.75 {
                    BODY_TO_WICK_TOP
                } else {
                    HALF_BODY_BOTTOM
                }
            } else if high - y > 0.75 {
                WICK
            } else if high - y > 0.25 {
                UPPER_WICK
            } else {
                VOID
            }
        } else if top.floor() >= y && y >= bottom.ceil() {
            BODY
        } else if bottom.ceil() >= y && y >= low.floor() {
            if bottom - y < 0.25 {
                BODY
            } else if bottom - y < 0.75 {
                if low - y < 0.25 {
                    BODY_TO_WICK_BOTTOM
                } else {
                    HALF_BODY_TOP
                }
            } else if low - y < 0.25 {
                WICK
            } else if low - y < 0.75 {
                LOWER_WICK
            } else {
                VOID
            }
        } else {
            VOID
        }
    }

    fn axis_label(&self, row: usize) -> String {
        if row % 4 == 0 || row == self.height {
            let price = self.min_price
                + row as f64 * (self.max_price - self.min_price) / self.height as f64;
            format!("{:>10.2} │ ", price)
        } else {
            format!("{:>10} │ ", "")
        }
    }

    fn rows(&self, columns: &[usize], width: usize) -> Vec<ChartRow> {
        (1..=self.height)
            .rev()
            .map(|row| {
                let mut cells = vec![Glyph::BLANK; width];
                for (candle, &column) in self.candles.iter().zip(columns) {
                    let ch = self.candle_glyph(candle, row);
                    if ch != VOID {
                        let tone = if candle.is_bullish() {
                            GlyphTone::Bullish
                        } else {
                            GlyphTone::Bearish
                        };
                        cells[column] = Glyph { ch, tone };
                    }
                }
                for (index, values) in &self.overlays {
                    for (value, &column) in values.iter().zip(columns) {
                        let Some(value) = value else { continue };
                        let on_row = self.to_height(*value).round().max(1.0) as usize == row;
                        if on_row && cells[column].tone == GlyphTone::Blank {
                            cells[column] = Glyph {
                                ch: overlay_mark(*index),
                                tone: GlyphTone::Overlay(*index),
                            };
                        }
                    }
                }
                ChartRow {
                    axis: self.axis_label(row),
                    cells,
                }
            })
            .collect()
    }
}

/// Spread `count` candles over `width` columns without drift.
fn columns(width: usize, count: usize) -> Vec<usize> {
    match count {
        0 => Vec::new(),
        1 => vec![width / 2],
        _ => {
            let spacing = width as f64 / count as f64;
            (0..count)
                .map(|i| ((i as f64 * spacing).round() as usize).min(width.saturating_sub(1)))
                .collect()
        }
    }
}

fn abbreviate(volume: f64) -> String {
    if volume >= 1e9 {
        format!("{:.1}B", volume / 1e9)
    } else if volume >= 1e6 {
        format!("{:.1}M", volume / 1e6)
    } else if volume >= 1e3 {
        format!("{:.1}K", volume / 1e3)
    } else {
        format!("{:.0}", volume)
    }
}

fn volume_rows(candles: &[Candle], columns: &[usize], width: usize) -> Vec<ChartRow> {
    let max_volume = candles.iter().fold(0.0_f64, |acc, c| acc.max(c.volume));
    let steps = (VOLUME_ROWS * 8) as f64;

    (0..VOLUME_ROWS)
        .rev()
        .map(|level| {
            let mut cells = vec![Glyph::BLANK; width];
            if max_volume > 0.0 {
                for (candle, &column) in candles.iter().zip(columns) {
                    let scaled = (candle.volume / max_volume * steps).round() as usize;
                    let filled = scaled.saturating_sub(level * 8).min(8);
                    if filled > 0 {
                        cells[column] = Glyph {
                            ch: VOLUME_BLOCKS[filled],
                            tone: GlyphTone::Volume,
                        };
                    }
                }
            }
            let axis = if level == VOLUME_ROWS - 1 {
                format!("{:>10} │ ", abbreviate(max_volume))
            } else if level == 0 {
                format!("{:>10} │ ", "Volume")
            } else {
                format!("{:>10} │ ", "")
            };
            ChartRow { axis, cells }
        })
        .collect()
}

fn time_row(candles: &[Candle], columns: &[usize], width: usize) -> ChartRow {
    let mut cells = vec![Glyph::BLANK; width];
    let mut next_free = 0;
    for (candle, &column) in candles.iter().zip(columns) {
        let label = candle.time_label();
        let len = label.chars().count();
        if column < next_free || column + len > width {
            continue;
        }
        for (offset, ch) in label.chars().enumerate() {
            cells[column + offset] = Glyph {
                ch,
                tone: GlyphTone::Axis,
            };
        }
        next_free = column + len + 2;
    }
    ChartRow {
        axis: format!("{:>10} └ ", ""),
        cells,
    }
}

/// Draw a chart into at most `max_width` plot columns. When there are more
/// candles than columns the most recent ones are kept.
pub fn draw(view: &ChartView, max_width: usize) -> Vec<ChartRow> {
    let width = max_width.max(1);
    let skip = view.candles.len().saturating_sub(width);
    let candles = &view.candles[skip..];
    if candles.is_empty() {
        return Vec::new();
    }

    let overlays: Vec<(usize, &[Option<f64>])> = view
        .overlays
        .iter()
        .enumerate()
        .map(|(index, Overlay { values, .. })| (index, &values[skip.min(values.len())..]))
        .collect();

    let columns = columns(width, candles.len());
    let pane = PricePane::new(candles, overlays, view.height.max(2));

    let mut rows = pane.rows(&columns, width);
    rows.extend(volume_rows(candles, &columns, width));
    rows.push(time_row(candles, &columns, width));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(ts: &str, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
        Candle {
            timestamp: ts.to_string(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn view(candles: Vec<Candle>) -> ChartView {
        ChartView {
            title: "AAPL".to_string(),
            candles,
            overlays: Vec::new(),
            height: 8,
        }
    }

    #[test]
    fn test_columns_spread_without_overflow() {
        assert_eq!(columns(10, 1), vec![5]);
        let spread = columns(10, 5);
        assert_eq!(spread, vec![0, 2, 4, 6, 8]);
        assert!(columns(3, 7).iter().all(|c| *c < 3));
    }

    #[test]
    fn test_draw_layout() {
        let chart = view(vec![
            candle("2024-03-04 09:30:00", 10.0, 12.0, 9.0, 11.0, 1000.0),
            candle("2024-03-04 09:31:00", 11.0, 11.5, 8.0, 8.5, 3000.0),
        ]);
        let rows = draw(&chart, 40);
        assert_eq!(rows.len(), 8 + VOLUME_ROWS + 1);
        assert!(rows.iter().all(|r| r.axis.chars().count() == AXIS_WIDTH));

        let tones: Vec<GlyphTone> = rows[..8]
            .iter()
            .flat_map(|r| r.cells.iter().map(|g| g.tone))
            .collect();
        assert!(tones.contains(&GlyphTone::Bullish));
        assert!(tones.contains(&GlyphTone::Bearish));

        // Highest volume reaches the top of the strip.
        let top_volume = &rows[8];
        assert!(top_volume.cells.iter().any(|g| g.ch == '█'));
        assert!(top_volume.axis.contains("3.0K"));

        assert!(rows.last().unwrap().plain().contains("09:30"));
    }

    #[test]
    fn test_keeps_latest_candles_when_narrow() {
        let candles: Vec<_> = (0..10)
            .map(|i| candle("t", i as f64, i as f64 + 1.0, i as f64, i as f64 + 0.5, 1.0))
            .collect();
        let rows = draw(&view(candles), 4);
        assert!(rows.iter().all(|r| r.cells.len() == 4));
    }

    #[test]
    fn test_overlay_marks_fill_blank_cells() {
        let candles = vec![
            candle("a", 10.0, 10.5, 9.5, 10.2, 1.0),
            candle("b", 10.2, 10.4, 9.8, 10.0, 1.0),
            candle("c", 10.0, 20.0, 10.0, 19.0, 1.0),
        ];
        let mut chart = view(candles);
        chart.overlays.push(Overlay {
            name: "SMA(1)".to_string(),
            values: vec![Some(18.0), None, None],
        });
        let rows = draw(&chart, 30);
        let marks = rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .filter(|g| g.tone == GlyphTone::Overlay(0))
            .count();
        assert_eq!(marks, 1);
    }

    #[test]
    fn test_empty_series_draws_nothing() {
        assert!(draw(&view(Vec::new()), 20).is_empty());
    }
}
