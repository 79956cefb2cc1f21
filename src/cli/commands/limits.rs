//! Rate limit inspection commands.

use console::style;

use gapchart::pipeline::{ACTIONS, THROTTLED_LABEL};
use gapchart::ui::messages::format_reset_time;
use gapchart::Dashboard;

/// Show every action's window state.
pub async fn cmd_limits(dashboard: &Dashboard) -> anyhow::Result<()> {
    let gate = dashboard.pipeline().gate();
    let windows = dashboard.pipeline().windows();
    let records = gate.states().await?;
    let now_ms = gate.now_ms();

    println!("{}", style("Rate limits").bold());
    for spec in ACTIONS {
        let window_hours = windows.for_policy(spec.policy).as_secs() / 3600;
        let budget = format!("{} per {}h", spec.policy.budget(), window_hours);
        match records.iter().find(|r| r.action == spec.name) {
            Some(record) => println!(
                "  {:<9} {:<12} {} until {}",
                spec.name,
                budget,
                style(THROTTLED_LABEL).red(),
                format_reset_time(record.reset_at_ms, now_ms)
            ),
            None => println!(
                "  {:<9} {:<12} {}",
                spec.name,
                budget,
                style("available").green()
            ),
        }
    }
    Ok(())
}

/// Drop the stored window of one action.
pub async fn cmd_limits_clear(dashboard: &Dashboard, action: &str) -> anyhow::Result<()> {
    if !dashboard.clear(action).await? {
        let names: Vec<&str> = ACTIONS.iter().map(|s| s.name).collect();
        anyhow::bail!("Unknown action '{}'. Expected one of: {}", action, names.join(", "));
    }
    println!("{} Cleared rate limit for {}", style("✓").green(), action);
    Ok(())
}
