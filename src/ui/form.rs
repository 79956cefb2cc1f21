//! Form state for one action.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use super::messages::throttle_notice;
use super::region::RegionContent;
use crate::models::QueryRequest;
use crate::pipeline::{ActionSpec, THROTTLED_LABEL};
use crate::rate_limit::GateListener;

/// What the user sees for one action: its selection, controls, submit
/// button and output region.
#[derive(Debug, Clone)]
pub struct FormView {
    spec: &'static ActionSpec,
    selection: QueryRequest,
    controls_enabled: bool,
    submit_label: String,
    region: RegionContent,
    /// Bumped on every region write.
    revision: u64,
}

impl FormView {
    pub fn new(spec: &'static ActionSpec) -> Self {
        Self {
            spec,
            selection: QueryRequest::new(),
            controls_enabled: true,
            submit_label: spec.submit_label.to_string(),
            region: RegionContent::Prompt(spec.idle_prompt.to_string()),
            revision: 0,
        }
    }

    pub fn spec(&self) -> &'static ActionSpec {
        self.spec
    }

    pub fn selection(&self) -> &QueryRequest {
        &self.selection
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn submit_label(&self) -> &str {
        &self.submit_label
    }

    pub fn region(&self) -> &RegionContent {
        &self.region
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Dates currently listed in the region, if it shows a list.
    pub fn listed_dates(&self) -> Option<&[String]> {
        match &self.region {
            RegionContent::DateList { dates, .. } => Some(dates),
            _ => None,
        }
    }

    pub fn set_selection(&mut self, selection: QueryRequest) {
        self.selection = selection;
    }

    /// Replace the region content.
    pub fn show(&mut self, content: RegionContent) {
        self.region = content;
        self.revision += 1;
    }

    /// Disable the form and show the throttle message.
    pub fn enter_throttled(&mut self, message: String) {
        self.controls_enabled = false;
        self.submit_label = THROTTLED_LABEL.to_string();
        self.show(RegionContent::alert(message));
    }

    /// Re-enable a throttled form and reset the region to its idle prompt.
    pub fn release(&mut self) {
        if !self.is_throttled() {
            return;
        }
        self.controls_enabled = true;
        self.submit_label = self.spec.submit_label.to_string();
        self.show(RegionContent::Prompt(self.spec.idle_prompt.to_string()));
    }

    pub fn is_throttled(&self) -> bool {
        !self.controls_enabled
    }
}

/// Shared handle to a [`FormView`], registered on the gate so timer
/// releases reach the form.
#[derive(Debug, Clone)]
pub struct FormHandle {
    view: Arc<Mutex<FormView>>,
    window: Duration,
}

impl FormHandle {
    /// `window` is the throttle window of the action's policy, used to word
    /// restored notices.
    pub fn new(spec: &'static ActionSpec, window: Duration) -> Self {
        Self {
            view: Arc::new(Mutex::new(FormView::new(spec))),
            window,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormView> {
        // Form state stays consistent across a panicked writer.
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn name(&self) -> &'static str {
        self.lock().spec.name
    }

    /// Copy of the current view.
    pub fn snapshot(&self) -> FormView {
        self.lock().clone()
    }

    pub fn show(&self, content: RegionContent) {
        self.lock().show(content);
    }

    pub fn set_selection(&self, selection: QueryRequest) {
        self.lock().set_selection(selection);
    }

    pub fn enter_throttled(&self, message: String) {
        self.lock().enter_throttled(message);
    }

    pub fn release(&self) {
        self.lock().release();
    }

    /// Date at `index` of the listed dates, with the request that produced
    /// the list.
    pub fn listed_date(&self, index: usize) -> Option<(String, QueryRequest)> {
        match &self.lock().region {
            RegionContent::DateList { dates, request } => {
                Some((dates.get(index)?.clone(), request.clone()))
            }
            _ => None,
        }
    }
}

impl GateListener for FormHandle {
    fn on_restored(&self, action: &str, reset_at_ms: i64, now_ms: i64) {
        let mut view = self.lock();
        let message = throttle_notice(
            view.spec.policy.budget(),
            self.window,
            reset_at_ms,
            now_ms,
        );
        debug!("Form {} restored into throttled state", action);
        view.enter_throttled(message);
    }

    fn on_release(&self, action: &str) {
        debug!("Form {} released", action);
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{CHART, EARNINGS, GAPS};
    use crate::ui::messages::format_reset_time;

    #[test]
    fn test_throttle_and_release_cycle() {
        let form = FormHandle::new(&GAPS, Duration::from_secs(3600));
        form.show(RegionContent::DateList {
            dates: vec!["2024-01-08".to_string()],
            request: QueryRequest::new(),
        });

        form.enter_throttled("Rate limit exceeded".to_string());
        let view = form.snapshot();
        assert!(!view.controls_enabled());
        assert_eq!(view.submit_label(), "Rate Limit Exceeded");
        assert_eq!(view.region(), &RegionContent::alert("Rate limit exceeded"));

        form.on_release("gaps");
        let view = form.snapshot();
        assert!(view.controls_enabled());
        assert_eq!(view.submit_label(), "Find Gap Dates");
        assert_eq!(
            view.region().text(),
            Some("Please select a gap size, day of the week, and gap direction to view gap dates.")
        );
    }

    #[test]
    fn test_restored_notice_mentions_budget() {
        let form = FormHandle::new(&CHART, Duration::from_secs(12 * 3600));
        let now = 1_709_560_800_000;
        let reset = now + 60_000;
        form.on_restored("chart", reset, now);

        let view = form.snapshot();
        assert!(view.is_throttled());
        let text = view.region().text().unwrap();
        assert!(text.contains("limit of 10 requests per 12 hours"));
        assert!(text.contains(&format!(
            "Please wait until {} to try again.",
            format_reset_time(reset, now)
        )));
    }

    #[test]
    fn test_listed_date_lookup() {
        let form = FormHandle::new(&GAPS, Duration::from_secs(3600));
        assert!(form.listed_date(0).is_none());

        form.show(RegionContent::DateList {
            dates: vec!["2024-01-08".to_string(), "2024-01-15".to_string()],
            request: QueryRequest::new().with("gap_direction", "Down"),
        });
        let (date, request) = form.listed_date(1).unwrap();
        assert_eq!(date, "2024-01-15");
        assert_eq!(request.get("gap_direction"), Some("Down"));
        assert!(form.listed_date(2).is_none());
    }

    #[test]
    fn test_listed_date_pairs_with_the_list_that_resolved_last() {
        let form = FormHandle::new(&EARNINGS, Duration::from_secs(3600));
        let msft = QueryRequest::new().with("ticker", "MSFT");
        let aapl = QueryRequest::new().with("ticker", "AAPL");

        // AAPL was submitted after MSFT, but MSFT's list arrived last.
        form.set_selection(msft.clone());
        form.set_selection(aapl);
        form.show(RegionContent::DateList {
            dates: vec!["2024-01-30".to_string()],
            request: msft.clone(),
        });

        let (date, request) = form.listed_date(0).unwrap();
        assert_eq!(date, "2024-01-30");
        assert_eq!(request, msft);
    }

    #[test]
    fn test_release_leaves_an_idle_form_alone() {
        let form = FormHandle::new(&GAPS, Duration::from_secs(3600));
        let list = RegionContent::DateList {
            dates: vec!["2024-01-08".to_string()],
            request: QueryRequest::new(),
        };
        form.show(list.clone());

        form.release();
        assert_eq!(form.snapshot().region(), &list);
    }
}
