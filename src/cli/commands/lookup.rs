//! Selection lookups: tickers, years and impact ranges.

use console::style;
use tracing::warn;

use gapchart::config::Settings;
use gapchart::http_client::Endpoint;
use gapchart::models::{BinsPayload, TickersPayload, YearsPayload};
use gapchart::options::{economic_bins, EARNINGS_OUTCOMES, EVENT_TYPES};

use super::super::helpers::{api_client, spinner};

fn print_list(heading: &str, items: &[String]) {
    println!("{}", style(heading).bold());
    if items.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for item in items {
        println!("  {}", item);
    }
}

/// List tickers with chart data.
pub async fn cmd_tickers(settings: &Settings) -> anyhow::Result<()> {
    let client = api_client(settings)?;
    let pb = spinner("Loading tickers...");
    let payload: TickersPayload = client.fetch(Endpoint::Tickers, &[]).await?;
    pb.finish_and_clear();

    print_list("Tickers", &payload.tickers);
    Ok(())
}

/// List years with economic events.
pub async fn cmd_years(settings: &Settings) -> anyhow::Result<()> {
    let client = api_client(settings)?;
    let pb = spinner("Loading years...");
    let payload: YearsPayload = client.fetch(Endpoint::Years, &[]).await?;
    pb.finish_and_clear();

    print_list("Years", &payload.labels());
    Ok(())
}

/// List impact ranges of an event type, falling back to the built-in ranges.
pub async fn cmd_bins(settings: &Settings, event_type: &str) -> anyhow::Result<()> {
    let Some(known) = economic_bins(event_type) else {
        anyhow::bail!(
            "Unknown event type '{}'. Expected one of: {}",
            event_type,
            EVENT_TYPES.join(", ")
        );
    };

    let client = api_client(settings)?;
    let params = [("event_type".to_string(), event_type.to_ascii_uppercase())];
    let pb = spinner("Loading ranges...");
    let fetched = client.fetch::<BinsPayload>(Endpoint::EconomicBins, &params).await;
    pb.finish_and_clear();

    let bins = match fetched {
        Ok(payload) if !payload.bins.is_empty() => payload.bins,
        Ok(_) => known.iter().map(|b| b.to_string()).collect(),
        Err(e) => {
            warn!("Falling back to built-in {} ranges: {}", event_type, e);
            known.iter().map(|b| b.to_string()).collect()
        }
    };

    print_list(&format!("{} impact ranges", event_type.to_ascii_uppercase()), &bins);
    Ok(())
}

/// List earnings outcome bins for a ticker, falling back to all outcomes.
pub async fn cmd_earnings_bins(settings: &Settings, ticker: &str) -> anyhow::Result<()> {
    let client = api_client(settings)?;
    let params = [("ticker".to_string(), ticker.to_string())];
    let pb = spinner("Loading outcomes...");
    let fetched = client.fetch::<BinsPayload>(Endpoint::EarningsBins, &params).await;
    pb.finish_and_clear();

    let bins = match fetched {
        Ok(payload) => payload.bins,
        Err(e) => {
            warn!("Falling back to built-in earnings outcomes: {}", e);
            EARNINGS_OUTCOMES
                .iter()
                .map(|o| o.description.to_string())
                .collect()
        }
    };

    print_list(&format!("{} earnings outcomes", ticker), &bins);
    Ok(())
}
