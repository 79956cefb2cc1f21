//! Terminal presentation of forms and regions.

use console::{style, StyledObject, Term};

use super::form::FormView;
use super::region::{ChartView, RegionContent, Tone};
use crate::render::candlestick::{self, overlay_mark, ChartRow, GlyphTone, AXIS_WIDTH};

/// Plot columns available on the current terminal.
pub fn plot_width() -> usize {
    let (_, cols) = Term::stdout().size();
    (cols as usize).saturating_sub(AXIS_WIDTH + 1).max(20)
}

fn chart_legend(view: &ChartView) -> Option<String> {
    if view.overlays.is_empty() {
        return None;
    }
    let entries: Vec<String> = view
        .overlays
        .iter()
        .enumerate()
        .map(|(i, overlay)| format!("{} {}", overlay_mark(i), overlay.name))
        .collect();
    Some(entries.join("   "))
}

/// Unstyled lines for a region.
pub fn region_lines(content: &RegionContent, width: usize) -> Vec<String> {
    match content {
        RegionContent::Prompt(text)
        | RegionContent::Loading(text)
        | RegionContent::Notice { text, .. } => vec![text.clone()],
        RegionContent::DateList { dates, .. } => dates
            .iter()
            .enumerate()
            .map(|(i, date)| format!("{:>4}. {}", i + 1, date))
            .collect(),
        RegionContent::Chart(view) => {
            let mut lines = vec![view.title.clone()];
            lines.extend(candlestick::draw(view, width).iter().map(ChartRow::plain));
            lines.extend(chart_legend(view));
            lines
        }
        RegionContent::ChartImage { title, path } => {
            vec![title.clone(), format!("Chart saved to {}", path.display())]
        }
        RegionContent::Insights(view) => {
            let mut lines = vec![view.title.clone()];
            for metric in &view.metrics {
                lines.push(String::new());
                lines.push(metric.title.clone());
                lines.push(format!("  Median: {}", metric.median));
                lines.push(format!("  Avg: {}", metric.average));
                if !metric.description.is_empty() {
                    lines.push(format!("  {}", metric.description));
                }
            }
            lines
        }
    }
}

fn styled_glyph(ch: char, tone: GlyphTone) -> StyledObject<char> {
    let glyph = style(ch);
    match tone {
        GlyphTone::Blank => glyph,
        GlyphTone::Bullish => glyph.green(),
        GlyphTone::Bearish => glyph.red(),
        GlyphTone::Overlay(i) => match i % 3 {
            0 => glyph.cyan(),
            1 => glyph.yellow(),
            _ => glyph.magenta(),
        },
        GlyphTone::Volume | GlyphTone::Axis => glyph.dim(),
    }
}

fn print_chart(view: &ChartView) {
    println!("{}", style(&view.title).bold());
    for row in candlestick::draw(view, plot_width()) {
        let cells: String = row
            .cells
            .iter()
            .map(|g| styled_glyph(g.ch, g.tone).to_string())
            .collect();
        println!("{}{}", style(&row.axis).dim(), cells.trim_end());
    }
    if let Some(legend) = chart_legend(view) {
        println!("{}", legend);
    }
}

/// Print a region with colours.
pub fn print_region(content: &RegionContent) {
    match content {
        RegionContent::Prompt(text) => println!("{}", style(text).dim()),
        RegionContent::Loading(text) => println!("{}", style(text).cyan()),
        RegionContent::Notice {
            text,
            tone: Tone::Plain,
        } => println!("{}", text),
        RegionContent::Notice {
            text,
            tone: Tone::Alert,
        } => println!("{}", style(text).red().bold()),
        RegionContent::DateList { dates, .. } => {
            for (i, date) in dates.iter().enumerate() {
                println!("  {} {}", style(format!("{:>3}.", i + 1)).dim(), style(date).cyan());
            }
        }
        RegionContent::Chart(view) => print_chart(view),
        RegionContent::ChartImage { title, path } => {
            println!("{}", style(title).bold());
            println!("  {} Chart saved to {}", style("✓").green(), path.display());
        }
        RegionContent::Insights(view) => {
            println!("{}", style(&view.title).bold());
            for metric in &view.metrics {
                println!();
                println!("  {}", style(&metric.title).bold());
                println!("    {} {}", style("Median:").dim(), style(&metric.median).green());
                println!("    {} {}", style("Avg:").dim(), metric.average);
                if !metric.description.is_empty() {
                    println!("    {}", style(&metric.description).dim());
                }
            }
        }
    }
}

/// One-line status of a form: name, submit label and control state.
pub fn form_status(view: &FormView) -> String {
    let state = if view.controls_enabled() {
        style("ready").green().to_string()
    } else {
        style("disabled").red().to_string()
    };
    format!(
        "{:<9} [{}] {}",
        view.spec().name,
        view.submit_label(),
        state
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryRequest;
    use crate::ui::{InsightsView, MetricDisplay};
    use std::path::PathBuf;

    #[test]
    fn test_date_list_numbering() {
        let lines = region_lines(
            &RegionContent::DateList {
                dates: vec!["2024-01-08".to_string(), "2024-01-15".to_string()],
                request: QueryRequest::new(),
            },
            40,
        );
        assert_eq!(lines, vec!["   1. 2024-01-08", "   2. 2024-01-15"]);
    }

    #[test]
    fn test_insights_lines() {
        let view = InsightsView {
            title: "QQQ Gap Insights".to_string(),
            metrics: vec![MetricDisplay {
                key: "gap_fill_rate".to_string(),
                title: "Gap Fill Rate".to_string(),
                median: "70%".to_string(),
                average: "65%".to_string(),
                description: String::new(),
            }],
        };
        let lines = region_lines(&RegionContent::Insights(view), 40);
        assert!(lines.contains(&"  Median: 70%".to_string()));
        assert!(lines.contains(&"  Avg: 65%".to_string()));
    }

    #[test]
    fn test_image_lines() {
        let lines = region_lines(
            &RegionContent::ChartImage {
                title: "AAPL".to_string(),
                path: PathBuf::from("/tmp/AAPL.png"),
            },
            40,
        );
        assert_eq!(lines[1], "Chart saved to /tmp/AAPL.png");
    }
}
