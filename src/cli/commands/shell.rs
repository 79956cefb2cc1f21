//! Interactive session.
//!
//! Each submission runs as its own task, so a slow chart never blocks the
//! other forms. Results print when they resolve, and throttled forms
//! announce themselves when their window elapses.

use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use gapchart::pipeline::{ACTIONS, CHART};
use gapchart::rate_limit::GateListener;
use gapchart::ui::present::form_status;
use gapchart::Dashboard;

use super::super::helpers::{print_form, split_args};
use super::{limits, QueryCommand};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    #[command(flatten)]
    Query(QueryCommand),

    /// Load the chart for the Nth date of the last (or named) list
    Pick {
        number: usize,
        /// List to pick from (dates, gaps, events, earnings)
        action: Option<String>,
    },

    /// Show every form's state
    Status,

    /// Show rate limit windows
    Limits,

    /// Clear the rate limit window of an action
    Clear { action: String },

    /// Leave the session
    #[command(alias = "exit")]
    Quit,
}

/// Prints a notice when a form is usable again.
struct ReleaseNotice;

impl GateListener for ReleaseNotice {
    fn on_release(&self, action: &str) {
        println!(
            "\n{} {} is available again",
            style("✓").green(),
            style(action).bold()
        );
    }
}

/// Run the read-submit loop on stdin until EOF or `quit`.
pub async fn cmd_shell(dashboard: Dashboard) -> anyhow::Result<()> {
    for spec in ACTIONS {
        dashboard
            .pipeline()
            .gate()
            .register(spec.name, Arc::new(ReleaseNotice))
            .await;
    }

    println!(
        "{} Type 'help' for commands, 'quit' to leave.",
        style("gapchart").bold()
    );
    for view in dashboard.views() {
        if !view.controls_enabled() {
            println!("  {}", form_status(&view));
        }
    }

    let last_list: Arc<Mutex<Option<&'static str>>> = Arc::new(Mutex::new(None));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let args = split_args(&line);
        if args.is_empty() {
            continue;
        }

        let parsed = match ShellLine::try_parse_from(&args) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Help and usage errors render through clap.
                let _ = e.print();
                continue;
            }
        };

        match parsed.command {
            ShellCommand::Query(command) => {
                let (query, pick) = match command.into_query() {
                    Ok(q) => q,
                    Err(e) => {
                        eprintln!("{} {}", style("✗").red(), e);
                        continue;
                    }
                };
                let spec = query.action();
                if spec.date_selection.is_some() {
                    set_last_list(&last_list, spec.name);
                }

                let dashboard = dashboard.clone();
                tokio::spawn(async move {
                    let outcome = dashboard.submit(query).await;
                    debug!("{} resolved as {}", spec.name, outcome.as_str());
                    if let Some(form) = dashboard.form(spec.name) {
                        println!();
                        print_form(form);
                    }
                    if let Some(number) = pick {
                        pick_date(&dashboard, spec.name, number).await;
                    }
                });
            }
            ShellCommand::Pick { number, action } => {
                let name = match action {
                    Some(name) => Some(name),
                    None => last_list_name(&last_list).map(str::to_string),
                };
                let Some(name) = name else {
                    eprintln!("{} No date list yet", style("!").yellow());
                    continue;
                };
                let dashboard = dashboard.clone();
                tokio::spawn(async move {
                    pick_date(&dashboard, &name, number).await;
                });
            }
            ShellCommand::Status => {
                for view in dashboard.views() {
                    println!("  {}", form_status(&view));
                }
            }
            ShellCommand::Limits => {
                if let Err(e) = limits::cmd_limits(&dashboard).await {
                    eprintln!("{} {}", style("✗").red(), e);
                }
            }
            ShellCommand::Clear { action } => {
                if let Err(e) = limits::cmd_limits_clear(&dashboard, &action).await {
                    eprintln!("{} {}", style("✗").red(), e);
                }
            }
            ShellCommand::Quit => break,
        }
    }

    Ok(())
}

async fn pick_date(dashboard: &Dashboard, action: &str, number: usize) {
    match dashboard.select_date(action, number).await {
        Ok(_) => {
            if let Some(form) = dashboard.form(CHART.name) {
                println!();
                print_form(form);
            }
        }
        Err(e) => eprintln!("{} {}", style("✗").red(), e),
    }
}

fn set_last_list(slot: &Mutex<Option<&'static str>>, name: &'static str) {
    let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(name);
}

fn last_list_name(slot: &Mutex<Option<&'static str>>) -> Option<&'static str> {
    *slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ShellCommand {
        ShellLine::try_parse_from(split_args(line)).unwrap().command
    }

    #[test]
    fn test_shell_commands() {
        assert!(matches!(parse("quit"), ShellCommand::Quit));
        assert!(matches!(parse("exit"), ShellCommand::Quit));
        assert!(matches!(parse("status"), ShellCommand::Status));
        assert!(matches!(
            parse("pick 3 gaps"),
            ShellCommand::Pick { number: 3, action: Some(ref a) } if a == "gaps"
        ));
        assert!(matches!(
            parse(r#"earnings MSFT --outcome "Slight Miss""#),
            ShellCommand::Query(QueryCommand::Earnings { .. })
        ));
    }

    #[test]
    fn test_last_list_tracking() {
        let slot = Mutex::new(None);
        assert_eq!(last_list_name(&slot), None);
        set_last_list(&slot, "events");
        assert_eq!(last_list_name(&slot), Some("events"));
    }
}
