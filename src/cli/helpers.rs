//! Shared helper functions for CLI commands.

use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use gapchart::analytics::TracingAnalytics;
use gapchart::config::Settings;
use gapchart::http_client::HttpClient;
use gapchart::pipeline::Pipeline;
use gapchart::rate_limit::{create_store, RateLimitGate};
use gapchart::render::ChartRenderer;
use gapchart::ui::present::print_region;
use gapchart::ui::FormHandle;
use gapchart::Dashboard;

/// HTTP client for the configured API.
pub fn api_client(settings: &Settings) -> anyhow::Result<HttpClient> {
    Ok(HttpClient::new(
        &settings.api_url,
        settings.timeout(),
        &settings.user_agent,
    )?)
}

/// Wire the store, gate, client and forms, then restore persisted windows.
pub async fn build_dashboard(settings: &Settings) -> anyhow::Result<Dashboard> {
    settings.ensure_directories()?;

    let store = create_store(
        settings.rate_limit_backend.as_deref(),
        &settings.database_path(),
    )?;
    let gate = RateLimitGate::new(store);
    let pipeline = Pipeline::new(
        Arc::new(api_client(settings)?),
        gate,
        settings.rate_windows(),
        Arc::new(TracingAnalytics),
    );
    let chart = ChartRenderer::new(
        settings.indicator_specs()?,
        settings.chart_height,
        settings.charts_dir(),
    );

    let dashboard = Dashboard::new(pipeline, chart).await;
    dashboard.restore().await?;
    Ok(dashboard)
}

/// A spinner on stderr with a message.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print a form's submit state and region.
pub fn print_form(form: &FormHandle) {
    let view = form.snapshot();
    if !view.controls_enabled() {
        println!(
            "{} {} [{}]",
            style("!").yellow(),
            view.spec().name,
            view.submit_label()
        );
    }
    print_region(view.region());
}

/// Split a shell line into arguments, honouring double quotes.
pub fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args_quotes() {
        assert_eq!(
            split_args(r#"earnings AAPL --outcome "Slight Beat""#),
            vec!["earnings", "AAPL", "--outcome", "Slight Beat"]
        );
        assert_eq!(split_args(r#"chart "" 2024-03-04"#), vec!["chart", "", "2024-03-04"]);
        assert!(split_args("   ").is_empty());
    }
}
