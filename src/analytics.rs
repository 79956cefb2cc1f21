//! Usage analytics events.
//!
//! Events carry a name, a category and a free-form label. The default sink
//! writes them as structured tracing events on the `gapchart::analytics`
//! target, so they can be filtered or shipped like any other log line.

use std::sync::{Arc, Mutex};

use tracing::info;

/// One analytics event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsEvent {
    pub name: &'static str,
    pub category: &'static str,
    pub label: String,
}

impl AnalyticsEvent {
    pub fn new(name: &'static str, category: &'static str, label: impl Into<String>) -> Self {
        Self {
            name,
            category,
            label: label.into(),
        }
    }
}

/// Destination for analytics events.
pub trait AnalyticsSink: Send + Sync {
    fn emit(&self, event: &AnalyticsEvent);
}

/// Logs events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn emit(&self, event: &AnalyticsEvent) {
        info!(
            target: "gapchart::analytics",
            event = event.name,
            category = event.category,
            label = %event.label,
            "analytics event"
        );
    }
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryAnalytics {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl MemoryAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl AnalyticsSink for MemoryAnalytics {
    fn emit(&self, event: &AnalyticsEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
