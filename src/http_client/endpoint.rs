//! Dashboard API endpoints.

use std::fmt;

/// A GET endpoint of the dashboard API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Tickers,
    Years,
    ValidDates,
    StockChart,
    Gaps,
    GapInsights,
    Events,
    EconomicEvents,
    EconomicBins,
    Earnings,
    EarningsByBin,
    EarningsBins,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Tickers => "/api/tickers",
            Endpoint::Years => "/api/years",
            Endpoint::ValidDates => "/api/valid_dates",
            Endpoint::StockChart => "/api/stock/chart",
            Endpoint::Gaps => "/api/gaps",
            Endpoint::GapInsights => "/api/gap_insights",
            Endpoint::Events => "/api/events",
            Endpoint::EconomicEvents => "/api/economic_events",
            Endpoint::EconomicBins => "/api/economic_bins",
            Endpoint::Earnings => "/api/earnings",
            Endpoint::EarningsByBin => "/api/earnings_by_bin",
            Endpoint::EarningsBins => "/api/earnings_bins",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
