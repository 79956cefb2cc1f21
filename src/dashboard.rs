//! The dashboard: one form per action, wired to a shared pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{OutcomeKind, QueryRequest};
use crate::pipeline::{action, ActionSpec, Pipeline, ACTIONS, CHART, DATES, EARNINGS, EVENTS, GAPS, INSIGHTS};
use crate::rate_limit::RateLimitResult;
use crate::render::{ChartRenderer, DateListRenderer, InsightsRenderer};
use crate::ui::{FormHandle, FormView};

/// Which filter an event query uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    Year(String),
    Bin(String),
}

/// A user submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Chart {
        ticker: String,
        date: String,
    },
    Dates {
        ticker: String,
    },
    Gaps {
        size: String,
        day: String,
        direction: String,
    },
    Insights {
        size: String,
        day: String,
        direction: String,
    },
    Events {
        event_type: String,
        filter: EventFilter,
    },
    Earnings {
        ticker: String,
        outcome: Option<String>,
    },
}

impl Query {
    pub fn action(&self) -> &'static ActionSpec {
        match self {
            Query::Chart { .. } => &CHART,
            Query::Dates { .. } => &DATES,
            Query::Gaps { .. } => &GAPS,
            Query::Insights { .. } => &INSIGHTS,
            Query::Events { .. } => &EVENTS,
            Query::Earnings { .. } => &EARNINGS,
        }
    }

    /// The request parameters, named as the API expects them.
    pub fn request(&self) -> QueryRequest {
        match self {
            Query::Chart { ticker, date } => QueryRequest::new()
                .with("ticker", ticker.as_str())
                .with("date", date.as_str()),
            Query::Dates { ticker } => QueryRequest::new().with("ticker", ticker.as_str()),
            Query::Gaps {
                size,
                day,
                direction,
            }
            | Query::Insights {
                size,
                day,
                direction,
            } => QueryRequest::new()
                .with("gap_size", size.as_str())
                .with("day", day.as_str())
                .with("gap_direction", direction.as_str()),
            Query::Events { event_type, filter } => {
                let request = QueryRequest::new().with("event_type", event_type.as_str());
                match filter {
                    EventFilter::Year(year) => request.with("year", year.as_str()),
                    EventFilter::Bin(bin) => request.with("bin", bin.as_str()),
                }
            }
            Query::Earnings { ticker, outcome } => {
                let request = QueryRequest::new().with("ticker", ticker.as_str());
                match outcome {
                    Some(bin) => request.with("bin", bin.as_str()),
                    None => request,
                }
            }
        }
    }
}

/// Picking an entry of a date list failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("{0} results are not a date list")]
    NotSelectable(String),
    #[error("no date #{number} in the {action} results")]
    NoSuchEntry { action: String, number: usize },
}

/// All forms of the dashboard and the pipeline they share.
#[derive(Clone)]
pub struct Dashboard {
    pipeline: Pipeline,
    forms: Arc<HashMap<&'static str, FormHandle>>,
    chart: ChartRenderer,
}

impl Dashboard {
    /// Build one form per action and register each on the gate.
    pub async fn new(pipeline: Pipeline, chart: ChartRenderer) -> Self {
        let windows = pipeline.windows();
        let mut forms = HashMap::new();
        for spec in ACTIONS {
            let form = FormHandle::new(spec, windows.for_policy(spec.policy));
            pipeline
                .gate()
                .register(spec.name, Arc::new(form.clone()))
                .await;
            forms.insert(spec.name, form);
        }

        Self {
            pipeline,
            forms: Arc::new(forms),
            chart,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn form(&self, action: &str) -> Option<&FormHandle> {
        self.forms.get(action)
    }

    /// Snapshots of every form, in dashboard order.
    pub fn views(&self) -> Vec<FormView> {
        ACTIONS
            .iter()
            .filter_map(|spec| self.forms.get(spec.name))
            .map(FormHandle::snapshot)
            .collect()
    }

    /// Re-arm windows left by an earlier run. Throttled forms are disabled.
    pub async fn restore(&self) -> RateLimitResult<usize> {
        let restored = self.pipeline.gate().restore().await?;
        if restored > 0 {
            info!("{} action(s) still throttled from a previous session", restored);
        }
        Ok(restored)
    }

    /// Drop an action's throttle window and re-enable its form.
    pub async fn clear(&self, action: &str) -> RateLimitResult<bool> {
        let Some(form) = self.forms.get(action) else {
            return Ok(false);
        };
        self.pipeline.gate().clear(action).await?;
        form.release();
        Ok(true)
    }

    pub async fn submit(&self, query: Query) -> OutcomeKind {
        self.run(query.action(), query.request()).await
    }

    /// Run an action with the given selection through its form.
    pub async fn run(&self, spec: &'static ActionSpec, request: QueryRequest) -> OutcomeKind {
        let Some(form) = self.forms.get(spec.name) else {
            return OutcomeKind::MissingSelection;
        };
        form.set_selection(request.clone());

        let pipeline = &self.pipeline;
        match spec.name {
            "chart" => pipeline.run(spec, &request, &self.chart, form).await.kind(),
            "insights" => pipeline.run(spec, &request, &InsightsRenderer, form).await.kind(),
            _ => pipeline.run(spec, &request, &DateListRenderer, form).await.kind(),
        }
    }

    /// Pick date `number` (1-based) of an action's list and load its chart.
    pub async fn select_date(&self, action_name: &str, number: usize) -> Result<OutcomeKind, SelectionError> {
        let spec =
            action(action_name).ok_or_else(|| SelectionError::UnknownAction(action_name.to_string()))?;
        let selection = spec
            .date_selection
            .as_ref()
            .ok_or_else(|| SelectionError::NotSelectable(spec.name.to_string()))?;
        let no_entry = || SelectionError::NoSuchEntry {
            action: spec.name.to_string(),
            number,
        };

        let form = self.forms.get(spec.name).ok_or_else(no_entry)?;
        let (date, request) = form
            .listed_date(number.checked_sub(1).ok_or_else(no_entry)?)
            .ok_or_else(no_entry)?;

        let ticker = (selection.chart_ticker)(&request);
        debug!("Picked {} date {} for {}", spec.name, date, ticker);

        let chart_request = QueryRequest::new()
            .with("ticker", ticker)
            .with("date", date.as_str());
        let outcome = self.run(&CHART, chart_request).await;

        if let Some(event) = selection.event {
            self.pipeline.analytics().emit(&event(&request, &date));
        }
        Ok(outcome)
    }
}
