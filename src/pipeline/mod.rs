//! Fetch-render pipeline shared by every action.
//!
//! One invocation validates the selection, consults the gate, issues a
//! single GET, classifies the answer and writes exactly one result into the
//! form's region. Failures never escape as errors; they become a
//! [`QueryOutcome`] and a rendered message.

mod action;
mod classify;

pub use action::{
    action, ActionSpec, DateSelection, RatePolicy, RateWindows, Route, ACTIONS, CHART, DATES,
    EARNINGS, EVENTS, GAPS, INDEX_TICKER, INSIGHTS, THROTTLED_LABEL,
};
pub use classify::{classify, Classified};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::analytics::AnalyticsSink;
use crate::http_client::ApiTransport;
use crate::models::{QueryOutcome, QueryRequest, ResultPayload};
use crate::rate_limit::{GateState, RateLimitGate};
use crate::render::Renderer;
use crate::ui::messages::{throttle_notice, throttled_response_message};
use crate::ui::{FormHandle, RegionContent};

/// Runs actions against one API, gate and analytics sink.
#[derive(Clone)]
pub struct Pipeline {
    transport: Arc<dyn ApiTransport>,
    gate: RateLimitGate,
    windows: RateWindows,
    analytics: Arc<dyn AnalyticsSink>,
}

impl Pipeline {
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        gate: RateLimitGate,
        windows: RateWindows,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            transport,
            gate,
            windows,
            analytics,
        }
    }

    pub fn gate(&self) -> &RateLimitGate {
        &self.gate
    }

    pub fn windows(&self) -> RateWindows {
        self.windows
    }

    pub fn analytics(&self) -> &Arc<dyn AnalyticsSink> {
        &self.analytics
    }

    /// Run one submission of `action` and render its outcome into `form`.
    pub async fn run<R: Renderer>(
        &self,
        action: &ActionSpec,
        request: &QueryRequest,
        renderer: &R,
        form: &FormHandle,
    ) -> QueryOutcome<R::Payload> {
        let route = action.route(request);
        let window = self.windows.for_policy(action.policy);

        if !request.missing(route.required).is_empty() {
            form.show(RegionContent::notice(route.missing_prompt));
            return QueryOutcome::MissingSelection(route.missing_prompt.to_string());
        }

        match self.gate.check(action.name).await {
            Ok(GateState::Throttled { reset_at_ms }) => {
                debug!("{} is throttled until {}, not sending", action.name, reset_at_ms);
                let message = throttle_notice(
                    action.policy.budget(),
                    window,
                    reset_at_ms,
                    self.gate.now_ms(),
                );
                form.enter_throttled(message.clone());
                return QueryOutcome::Throttled {
                    reset_at_ms,
                    message,
                };
            }
            Ok(GateState::Idle) => {}
            Err(e) => warn!("Rate limit check for {} failed: {}", action.name, e),
        }

        form.show(RegionContent::Loading(action.loading_text.to_string()));
        debug!("{} -> {} {:?}", action.name, route.endpoint, request.params());

        let response = match self.transport.get(route.endpoint, &request.params()).await {
            Ok(response) => response,
            Err(e) => {
                warn!("{} request failed: {}", action.name, e);
                return failure(action, form);
            }
        };

        match classify::<R::Payload>(&response) {
            Classified::Throttled { server_message } => {
                let reset_at_ms = match self.gate.arm(action.name, window).await {
                    Ok(reset_at_ms) => reset_at_ms,
                    Err(e) => {
                        warn!("Failed to persist rate limit for {}: {}", action.name, e);
                        self.gate.reset_after(window)
                    }
                };
                let message = throttled_response_message(
                    server_message.as_deref(),
                    action.policy.budget(),
                    window,
                    reset_at_ms,
                    self.gate.now_ms(),
                );
                warn!("{} throttled by server until {}", action.name, reset_at_ms);
                form.enter_throttled(message.clone());
                QueryOutcome::Throttled {
                    reset_at_ms,
                    message,
                }
            }
            Classified::Failed(detail) => {
                warn!("{} answered unexpectedly: {}", action.name, detail);
                failure(action, form)
            }
            Classified::ApplicationError(message) => {
                info!("{} returned an error: {}", action.name, message);
                form.show(RegionContent::notice(message.clone()));
                QueryOutcome::ApplicationError(message)
            }
            Classified::Empty(server_message) => {
                let message = server_message.unwrap_or_else(|| (action.empty_message)(request));
                form.show(RegionContent::notice(message.clone()));
                QueryOutcome::EmptyResult(message)
            }
            Classified::Success(payload) => {
                form.show(renderer.render(&payload, request));
                if let Some(event) = action.success_event {
                    self.analytics.emit(&event(request));
                }
                QueryOutcome::Success(payload)
            }
        }
    }
}

fn failure<P: ResultPayload>(action: &ActionSpec, form: &FormHandle) -> QueryOutcome<P> {
    form.show(RegionContent::notice(action.failure_message));
    QueryOutcome::TransportError(action.failure_message.to_string())
}
