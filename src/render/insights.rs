use crate::models::{display_value, InsightsPayload, QueryRequest};
use crate::pipeline::INDEX_TICKER;
use crate::ui::{InsightsView, MetricDisplay, RegionContent};

use super::Renderer;

/// Display order of the known gap statistics. Unknown keys follow,
/// alphabetically.
pub const METRIC_ORDER: [&str; 8] = [
    "gap_fill_rate",
    "median_move_before_fill",
    "median_max_move_unfilled",
    "median_time_to_fill",
    "reversal_after_fill_rate",
    "median_move_before_reversal",
    "median_time_of_low",
    "median_time_of_high",
];

/// `median_time_to_fill` -> `Median Time To Fill`.
pub fn metric_title(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn unit(key: &str) -> &'static str {
    if key.contains("time") {
        ""
    } else {
        "%"
    }
}

/// Labeled metric cards for the gap statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightsRenderer;

impl Renderer for InsightsRenderer {
    type Payload = InsightsPayload;

    fn render(&self, payload: &InsightsPayload, request: &QueryRequest) -> RegionContent {
        let known = METRIC_ORDER.iter().copied().filter(|key| payload.insights.contains_key(*key));
        // BTreeMap iterates in key order.
        let others = payload
            .insights
            .keys()
            .map(String::as_str)
            .filter(|key| !METRIC_ORDER.contains(key));

        let metrics = known
            .chain(others)
            .filter_map(|key| {
                let stat = payload.insights.get(key)?;
                let unit = unit(key);
                Some(MetricDisplay {
                    key: key.to_string(),
                    title: metric_title(key),
                    median: format!("{}{}", display_value(&stat.median), unit),
                    average: format!("{}{}", display_value(&stat.average), unit),
                    description: stat.description.clone(),
                })
            })
            .collect();

        RegionContent::Insights(InsightsView {
            title: format!(
                "{} Gap Insights for {} {} gaps on {}",
                INDEX_TICKER,
                request.value("gap_size").unwrap_or_default(),
                request.value("gap_direction").unwrap_or_default(),
                request.value("day").unwrap_or_default()
            ),
            metrics,
        })
    }
}
