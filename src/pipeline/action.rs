//! Catalog of dashboard actions.
//!
//! Each action names its endpoint routes, required fields, rate policy and
//! the wording of every message its form can show.

use std::fmt;
use std::time::Duration;

use crate::analytics::AnalyticsEvent;
use crate::http_client::Endpoint;
use crate::models::QueryRequest;

/// Ticker charted when a gap or event date is picked.
pub const INDEX_TICKER: &str = "QQQ";

/// Submit label while an action is throttled.
pub const THROTTLED_LABEL: &str = "Rate Limit Exceeded";

/// Request budget class of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatePolicy {
    /// 10 requests per window.
    Standard,
    /// 3 requests per window.
    Strict,
}

impl RatePolicy {
    pub fn budget(&self) -> u32 {
        match self {
            RatePolicy::Standard => 10,
            RatePolicy::Strict => 3,
        }
    }
}

/// Window length per policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindows {
    pub standard: Duration,
    pub strict: Duration,
}

impl RateWindows {
    pub fn for_policy(&self, policy: RatePolicy) -> Duration {
        match policy {
            RatePolicy::Standard => self.standard,
            RatePolicy::Strict => self.strict,
        }
    }
}

impl Default for RateWindows {
    fn default() -> Self {
        let twelve_hours = Duration::from_secs(12 * 60 * 60);
        Self {
            standard: twelve_hours,
            strict: twelve_hours,
        }
    }
}

/// One endpoint an action can call.
#[derive(Debug)]
pub struct Route {
    pub endpoint: Endpoint,
    pub required: &'static [&'static str],
    /// Shown when a required field is empty.
    pub missing_prompt: &'static str,
    /// The route is taken when this parameter is present in the request.
    pub selector: Option<&'static str>,
}

/// How a rendered date list turns into a chart request.
#[derive(Debug)]
pub struct DateSelection {
    pub chart_ticker: fn(&QueryRequest) -> String,
    /// Event emitted after the chart is requested.
    pub event: Option<fn(&QueryRequest, &str) -> AnalyticsEvent>,
}

/// Static description of one dashboard action.
pub struct ActionSpec {
    pub name: &'static str,
    pub policy: RatePolicy,
    pub routes: &'static [Route],
    pub submit_label: &'static str,
    pub loading_text: &'static str,
    pub idle_prompt: &'static str,
    pub failure_message: &'static str,
    pub empty_message: fn(&QueryRequest) -> String,
    /// Event emitted after a successful render.
    pub success_event: Option<fn(&QueryRequest) -> AnalyticsEvent>,
    pub date_selection: Option<DateSelection>,
}

impl fmt::Debug for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSpec")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ActionSpec {
    /// Pick the route for a request: the last route whose selector is
    /// present, else the first.
    pub fn route(&self, request: &QueryRequest) -> &Route {
        self.routes
            .iter()
            .rev()
            .find(|route| match route.selector {
                Some(name) => request.get(name).is_some(),
                None => false,
            })
            .unwrap_or(&self.routes[0])
    }
}

fn param(request: &QueryRequest, name: &str) -> String {
    request.value(name).unwrap_or_default().to_string()
}

fn optional_suffix(request: &QueryRequest, name: &str) -> String {
    request
        .value(name)
        .map(|v| format!("_{}", v))
        .unwrap_or_default()
}

pub static CHART: ActionSpec = ActionSpec {
    name: "chart",
    policy: RatePolicy::Standard,
    routes: &[Route {
        endpoint: Endpoint::StockChart,
        required: &["ticker", "date"],
        missing_prompt: "Please select a ticker and date.",
        selector: None,
    }],
    submit_label: "Load Chart",
    loading_text: "Loading chart...",
    idle_prompt: "Please select a ticker and date to generate a chart.",
    failure_message: "Failed to load chart. Please try again later.",
    empty_message: |_| "No data available for the selected date. Try another date.".to_string(),
    success_event: Some(|request| {
        AnalyticsEvent::new(
            "chart_load",
            "Chart",
            format!("{}_{}", param(request, "ticker"), param(request, "date")),
        )
    }),
    date_selection: None,
};

pub static DATES: ActionSpec = ActionSpec {
    name: "dates",
    policy: RatePolicy::Standard,
    routes: &[Route {
        endpoint: Endpoint::ValidDates,
        required: &["ticker"],
        missing_prompt: "Please select a ticker.",
        selector: None,
    }],
    submit_label: "Load Dates",
    loading_text: "Loading dates...",
    idle_prompt: "Select a ticker to view its available dates.",
    failure_message: "Failed to load dates. Please try again later.",
    empty_message: |request| format!("No dates available for {}", param(request, "ticker")),
    success_event: None,
    date_selection: Some(DateSelection {
        chart_ticker: |request| param(request, "ticker"),
        event: None,
    }),
};

pub static GAPS: ActionSpec = ActionSpec {
    name: "gaps",
    policy: RatePolicy::Standard,
    routes: &[Route {
        endpoint: Endpoint::Gaps,
        required: &["gap_size", "day", "gap_direction"],
        missing_prompt: "Please select a gap size, day of the week, and gap direction.",
        selector: None,
    }],
    submit_label: "Find Gap Dates",
    loading_text: "Loading gap dates...",
    idle_prompt:
        "Please select a gap size, day of the week, and gap direction to view gap dates.",
    failure_message: "Failed to load gap dates. Please try again later.",
    empty_message: |_| "No gaps found for the selected criteria".to_string(),
    success_event: None,
    date_selection: Some(DateSelection {
        chart_ticker: |_| INDEX_TICKER.to_string(),
        event: Some(|request, date| {
            AnalyticsEvent::new(
                "gap_date_click",
                "Gap Analysis",
                format!(
                    "{}_{}_{}",
                    INDEX_TICKER,
                    date,
                    param(request, "gap_direction")
                ),
            )
        }),
    }),
};

pub static INSIGHTS: ActionSpec = ActionSpec {
    name: "insights",
    policy: RatePolicy::Strict,
    routes: &[Route {
        endpoint: Endpoint::GapInsights,
        required: &["gap_size", "day", "gap_direction"],
        missing_prompt: "Please select a gap size, day of the week, and gap direction.",
        selector: None,
    }],
    submit_label: "Get Insights",
    loading_text: "Loading gap insights...",
    idle_prompt:
        "Select a gap size, day of the week, and gap direction to view gap insights.",
    failure_message: "Failed to load gap insights. Please try again later.",
    empty_message: |_| "No gap insights found for the selected criteria".to_string(),
    success_event: Some(|request| {
        AnalyticsEvent::new(
            "gap_insights_load",
            "Gap Insights",
            format!(
                "{}_{}_{}",
                param(request, "gap_size"),
                param(request, "day"),
                param(request, "gap_direction")
            ),
        )
    }),
    date_selection: None,
};

pub static EVENTS: ActionSpec = ActionSpec {
    name: "events",
    policy: RatePolicy::Standard,
    routes: &[
        Route {
            endpoint: Endpoint::Events,
            required: &["event_type", "year"],
            missing_prompt: "Please select an event type and year.",
            selector: None,
        },
        Route {
            endpoint: Endpoint::EconomicEvents,
            required: &["event_type", "bin"],
            missing_prompt: "Please select an event type and economic impact range.",
            selector: Some("bin"),
        },
    ],
    submit_label: "Find Event Dates",
    loading_text: "Loading event dates...",
    idle_prompt: "Select filters to view dates with events.",
    failure_message: "Failed to load event dates. Please try again later.",
    empty_message: |_| "No events found for the selected criteria".to_string(),
    success_event: None,
    date_selection: Some(DateSelection {
        chart_ticker: |_| INDEX_TICKER.to_string(),
        event: Some(|request, date| {
            AnalyticsEvent::new(
                "event_date_click",
                "Event Analysis",
                format!(
                    "{}_{}_{}{}",
                    INDEX_TICKER,
                    date,
                    param(request, "event_type"),
                    optional_suffix(request, "bin")
                ),
            )
        }),
    }),
};

pub static EARNINGS: ActionSpec = ActionSpec {
    name: "earnings",
    policy: RatePolicy::Standard,
    routes: &[
        Route {
            endpoint: Endpoint::Earnings,
            required: &["ticker"],
            missing_prompt: "Please select a ticker.",
            selector: None,
        },
        Route {
            endpoint: Endpoint::EarningsByBin,
            required: &["ticker", "bin"],
            missing_prompt: "Please select a ticker and earnings outcome.",
            selector: Some("bin"),
        },
    ],
    submit_label: "Find Earnings Dates",
    loading_text: "Loading earnings dates...",
    idle_prompt:
        "Select a ticker and optionally an earnings outcome to view earnings dates.",
    failure_message: "Failed to load earnings dates. Please try again later.",
    empty_message: |request| match request.value("bin") {
        Some(bin) => format!(
            "No earnings found for {} with outcome {}",
            param(request, "ticker"),
            bin
        ),
        None => format!("No earnings found for {}", param(request, "ticker")),
    },
    success_event: None,
    date_selection: Some(DateSelection {
        chart_ticker: |request| param(request, "ticker"),
        event: Some(|request, date| {
            AnalyticsEvent::new(
                "earnings_date_click",
                "Earnings Analysis",
                format!(
                    "{}_{}{}",
                    param(request, "ticker"),
                    date,
                    optional_suffix(request, "bin")
                ),
            )
        }),
    }),
};

/// Every action, in dashboard order.
pub static ACTIONS: [&ActionSpec; 6] = [&CHART, &DATES, &GAPS, &INSIGHTS, &EVENTS, &EARNINGS];

/// Look up an action by name.
pub fn action(name: &str) -> Option<&'static ActionSpec> {
    ACTIONS.iter().copied().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_selection_by_bin() {
        let by_year = QueryRequest::new()
            .with("event_type", "CPI")
            .with("year", "2023");
        assert_eq!(EVENTS.route(&by_year).endpoint, Endpoint::Events);

        let by_bin = QueryRequest::new()
            .with("event_type", "CPI")
            .with("bin", "");
        let route = EVENTS.route(&by_bin);
        assert_eq!(route.endpoint, Endpoint::EconomicEvents);
        assert_eq!(by_bin.missing(route.required), vec!["bin"]);
    }

    #[test]
    fn test_earnings_messages() {
        let request = QueryRequest::new().with("ticker", "MSFT");
        assert_eq!(EARNINGS.route(&request).endpoint, Endpoint::Earnings);
        assert_eq!((EARNINGS.empty_message)(&request), "No earnings found for MSFT");

        let with_bin = request.with("bin", "Miss");
        assert_eq!(
            (EARNINGS.empty_message)(&with_bin),
            "No earnings found for MSFT with outcome Miss"
        );
    }

    #[test]
    fn test_date_selection_labels() {
        let gaps = QueryRequest::new()
            .with("gap_size", "0-1%")
            .with("day", "Monday")
            .with("gap_direction", "Up");
        let selection = GAPS.date_selection.as_ref().unwrap();
        assert_eq!((selection.chart_ticker)(&gaps), "QQQ");
        let event = (selection.event.unwrap())(&gaps, "2024-01-08");
        assert_eq!(event.name, "gap_date_click");
        assert_eq!(event.label, "QQQ_2024-01-08_Up");

        let events = QueryRequest::new()
            .with("event_type", "CPI")
            .with("bin", "1-2%");
        let event = (EVENTS.date_selection.as_ref().unwrap().event.unwrap())(&events, "2023-05-10");
        assert_eq!(event.label, "QQQ_2023-05-10_CPI_1-2%");

        let earnings = QueryRequest::new().with("ticker", "AAPL");
        let selection = EARNINGS.date_selection.as_ref().unwrap();
        assert_eq!((selection.chart_ticker)(&earnings), "AAPL");
        assert_eq!(
            (selection.event.unwrap())(&earnings, "2024-02-01").label,
            "AAPL_2024-02-01"
        );
    }

    #[test]
    fn test_lookup_and_policies() {
        assert_eq!(action("insights").unwrap().policy.budget(), 3);
        assert_eq!(action("chart").unwrap().policy.budget(), 10);
        assert!(action("unknown").is_none());
    }
}
