//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod limits;
mod lookup;
mod query;
mod shell;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::style;

use gapchart::config::{load_settings_with_options, LoadOptions};
use gapchart::options::{
    earnings_outcome, economic_bins, EARNINGS_OUTCOMES, GAP_DIRECTIONS, WEEKDAYS,
};
use gapchart::{EventFilter, Query};

use super::helpers::build_dashboard;

#[derive(Parser)]
#[command(name = "gapchart")]
#[command(about = "Charts, gap dates, economic events and earnings from the gap dashboard API")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the rate limit database and saved charts
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Dashboard API root URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Gap filter shared by `gaps` and `insights`.
#[derive(Args, Debug, Clone)]
pub struct GapArgs {
    /// Gap size bucket, e.g. "0-1%"
    #[arg(long, default_value = "")]
    size: String,
    /// Day of the week, e.g. Monday
    #[arg(long, default_value = "")]
    day: String,
    /// Gap direction: Up or Down
    #[arg(long, default_value = "")]
    direction: String,
}

impl GapArgs {
    /// Match day and direction to their catalog spelling, warning on values the
    /// catalogs do not know. Unknown values still go to the server.
    fn canonical(self) -> Self {
        Self {
            day: canonical_choice(self.day, &WEEKDAYS, "day"),
            direction: canonical_choice(self.direction, &GAP_DIRECTIONS, "gap direction"),
            size: self.size,
        }
    }
}

fn canonical_choice(value: String, known: &[&'static str], what: &str) -> String {
    if value.trim().is_empty() {
        return value;
    }
    match known.iter().find(|k| k.eq_ignore_ascii_case(value.trim())) {
        Some(k) => k.to_string(),
        None => {
            eprintln!(
                "{} '{}' is not a known {} ({})",
                style("!").yellow(),
                value,
                what,
                known.join(", ")
            );
            value
        }
    }
}

/// Commands that submit a dashboard form.
#[derive(Subcommand, Debug, Clone)]
pub enum QueryCommand {
    /// Load the intraday chart for a ticker and date
    Chart {
        ticker: Option<String>,
        /// Trading date (YYYY-MM-DD)
        date: Option<String>,
    },

    /// List dates with chart data for a ticker
    Dates {
        ticker: Option<String>,
        /// Load the chart for the Nth listed date
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Find QQQ dates with a matching opening gap
    Gaps {
        #[command(flatten)]
        gap: GapArgs,
        /// Load the chart for the Nth listed date
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Gap fill statistics for a gap filter
    Insights {
        #[command(flatten)]
        gap: GapArgs,
    },

    /// Find dates of an economic event, by year or by impact range
    Events {
        /// Event type: CPI, PPI, NFP or FOMC
        #[arg(long, default_value = "")]
        event_type: String,
        /// Filter by year
        #[arg(long, conflicts_with = "bin")]
        year: Option<String>,
        /// Filter by economic impact range, e.g. "1-2%"
        #[arg(long)]
        bin: Option<String>,
        /// Load the chart for the Nth listed date
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Find earnings dates for a ticker, optionally by surprise outcome
    Earnings {
        ticker: Option<String>,
        /// Beat, Slight Beat, Miss, Slight Miss or Unknown
        #[arg(long)]
        outcome: Option<String>,
        /// Load the chart for the Nth listed date
        #[arg(long)]
        pick: Option<usize>,
    },
}

impl QueryCommand {
    /// The submission and the list entry to pick afterwards.
    pub fn into_query(self) -> anyhow::Result<(Query, Option<usize>)> {
        let query = match self {
            QueryCommand::Chart { ticker, date } => (
                Query::Chart {
                    ticker: ticker.unwrap_or_default(),
                    date: date.unwrap_or_default(),
                },
                None,
            ),
            QueryCommand::Dates { ticker, pick } => (
                Query::Dates {
                    ticker: ticker.unwrap_or_default(),
                },
                pick,
            ),
            QueryCommand::Gaps { gap, pick } => {
                let gap = gap.canonical();
                (
                    Query::Gaps {
                        size: gap.size,
                        day: gap.day,
                        direction: gap.direction,
                    },
                    pick,
                )
            }
            QueryCommand::Insights { gap } => {
                let gap = gap.canonical();
                (
                    Query::Insights {
                        size: gap.size,
                        day: gap.day,
                        direction: gap.direction,
                    },
                    None,
                )
            }
            QueryCommand::Events {
                event_type,
                year,
                bin,
                pick,
            } => {
                let filter = match bin {
                    Some(bin) => {
                        if let Some(known) = economic_bins(&event_type) {
                            if !bin.is_empty() && !known.contains(&bin.as_str()) {
                                eprintln!(
                                    "{} '{}' is not a known {} range ({})",
                                    style("!").yellow(),
                                    bin,
                                    event_type,
                                    known.join(", ")
                                );
                            }
                        }
                        EventFilter::Bin(bin)
                    }
                    None => EventFilter::Year(year.unwrap_or_default()),
                };
                (Query::Events { event_type, filter }, pick)
            }
            QueryCommand::Earnings {
                ticker,
                outcome,
                pick,
            } => {
                let outcome = match outcome {
                    Some(name) if name.trim().is_empty() => Some(String::new()),
                    Some(name) => match earnings_outcome(&name) {
                        Some(known) => Some(known.value.to_string()),
                        None => {
                            let valid: Vec<&str> =
                                EARNINGS_OUTCOMES.iter().map(|o| o.value).collect();
                            anyhow::bail!(
                                "Unknown earnings outcome '{}'. Expected one of: {}",
                                name,
                                valid.join(", ")
                            );
                        }
                    },
                    None => None,
                };
                (
                    Query::Earnings {
                        ticker: ticker.unwrap_or_default(),
                        outcome,
                    },
                    pick,
                )
            }
        };
        Ok(query)
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Query(QueryCommand),

    /// List tickers with chart data
    Tickers,

    /// List years with economic events
    Years,

    /// List impact ranges of an economic event type
    Bins {
        /// Event type: CPI, PPI, NFP or FOMC
        #[arg(long)]
        event_type: String,
    },

    /// List earnings outcome bins for a ticker
    EarningsBins { ticker: String },

    /// Show or clear rate limit windows
    Limits {
        #[command(subcommand)]
        command: Option<LimitsCommands>,
    },

    /// Interactive session; queries run in the background
    Shell,
}

#[derive(Subcommand)]
enum LimitsCommands {
    /// Clear the rate limit window of an action
    Clear {
        /// Action name (chart, dates, gaps, insights, events, earnings)
        action: String,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
        api_url: cli.api_url,
    };
    let (settings, _config) = load_settings_with_options(options).await?;

    match cli.command {
        Commands::Query(command) => {
            let (query, pick) = command.into_query()?;
            let dashboard = build_dashboard(&settings).await?;
            query::cmd_query(&dashboard, query, pick).await
        }
        Commands::Tickers => lookup::cmd_tickers(&settings).await,
        Commands::Years => lookup::cmd_years(&settings).await,
        Commands::Bins { event_type } => lookup::cmd_bins(&settings, &event_type).await,
        Commands::EarningsBins { ticker } => lookup::cmd_earnings_bins(&settings, &ticker).await,
        Commands::Limits { command } => {
            let dashboard = build_dashboard(&settings).await?;
            match command {
                None => limits::cmd_limits(&dashboard).await,
                Some(LimitsCommands::Clear { action }) => {
                    limits::cmd_limits_clear(&dashboard, &action).await
                }
            }
        }
        Commands::Shell => {
            let dashboard = build_dashboard(&settings).await?;
            shell::cmd_shell(dashboard).await
        }
    }
}
