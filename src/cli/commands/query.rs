//! Form submission commands.

use console::style;

use gapchart::pipeline::CHART;
use gapchart::{Dashboard, OutcomeKind, Query};

use super::super::helpers::{print_form, spinner};

/// Submit one query, print its form, and optionally load a listed date's chart.
pub async fn cmd_query(dashboard: &Dashboard, query: Query, pick: Option<usize>) -> anyhow::Result<()> {
    let spec = query.action();

    let pb = spinner(spec.loading_text);
    let outcome = dashboard.submit(query).await;
    pb.finish_and_clear();

    if let Some(form) = dashboard.form(spec.name) {
        print_form(form);
    }

    let Some(number) = pick else {
        return Ok(());
    };
    if outcome != OutcomeKind::Success {
        println!(
            "{} Nothing to pick: {} returned {}",
            style("!").yellow(),
            spec.name,
            outcome.as_str()
        );
        return Ok(());
    }

    let pb = spinner(CHART.loading_text);
    let picked = dashboard.select_date(spec.name, number).await;
    pb.finish_and_clear();

    picked?;
    println!();
    if let Some(form) = dashboard.form(CHART.name) {
        print_form(form);
    }
    Ok(())
}
