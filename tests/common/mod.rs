//! Stub dashboard API and dashboard wiring shared by integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use gapchart::analytics::MemoryAnalytics;
use gapchart::http_client::HttpClient;
use gapchart::pipeline::{Pipeline, RateWindows};
use gapchart::rate_limit::{BoxedRateLimitStore, RateLimitGate};
use gapchart::render::ChartRenderer;
use gapchart::Dashboard;

/// Requests the stub has answered, as (path, query parameters).
#[derive(Clone, Default)]
pub struct Hits(Arc<Mutex<Vec<(String, HashMap<String, String>)>>>);

impl Hits {
    fn record(&self, path: &str, params: HashMap<String, String>) {
        self.0.lock().unwrap().push((path.to_string(), params));
    }

    pub fn count(&self, path: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|(p, _)| p == path).count()
    }

    pub fn last(&self, path: &str) -> Option<HashMap<String, String>> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, params)| params.clone())
    }
}

pub struct Stub {
    pub base_url: String,
    pub hits: Hits,
}

/// Serve fixed answers on an ephemeral local port.
pub async fn serve(routes: Vec<(&'static str, StatusCode, Value)>) -> Stub {
    let hits = Hits::default();
    let mut router = Router::new();

    for (path, status, body) in routes {
        let hits = hits.clone();
        router = router.route(
            path,
            get(move |Query(params): Query<HashMap<String, String>>| {
                let hits = hits.clone();
                let body = body.clone();
                async move {
                    hits.record(path, params);
                    (status, Json(body))
                }
            }),
        );
    }

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Stub {
        base_url: format!("http://{}", addr),
        hits,
    }
}

/// A dashboard talking to `base_url` over real HTTP.
pub async fn dashboard(
    base_url: &str,
    store: BoxedRateLimitStore,
    chart_dir: &Path,
) -> (Dashboard, MemoryAnalytics) {
    let client = HttpClient::new(base_url, Duration::from_secs(5), "gapchart-tests").unwrap();
    let analytics = MemoryAnalytics::new();
    let pipeline = Pipeline::new(
        Arc::new(client),
        RateLimitGate::new(store),
        RateWindows::default(),
        Arc::new(analytics.clone()),
    );
    let chart = ChartRenderer::new(Vec::new(), 12, chart_dir.to_path_buf());
    (Dashboard::new(pipeline, chart).await, analytics)
}

/// Five one-minute bars of AAPL.
pub fn five_bar_chart() -> Value {
    serde_json::json!({
        "chart_data": {
            "ticker": "AAPL",
            "date": "2024-03-04",
            "timestamp": [
                "2024-03-04 09:30:00",
                "2024-03-04 09:31:00",
                "2024-03-04 09:32:00",
                "2024-03-04 09:33:00",
                "2024-03-04 09:34:00"
            ],
            "open": [170.0, 170.5, 171.0, 170.8, 171.2],
            "high": [170.9, 171.3, 171.4, 171.5, 171.9],
            "low": [169.8, 170.2, 170.6, 170.5, 171.0],
            "close": [170.5, 171.0, 170.8, 171.2, 171.8],
            "volume": [12000.0, 9000.0, 8000.0, 7500.0, 11000.0]
        }
    })
}
