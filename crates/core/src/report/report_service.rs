use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use lotfolio_market_data::{Clock, MarketFeed, QuoteFetcher, SystemClock};

use super::report_formatter::ReportFormatter;
use super::report_model::MarketSnapshot;
use crate::errors::{Error, Result};
use crate::portfolio::valuation::value_portfolio;
use crate::portfolio::Portfolio;
use crate::summary::summarize;

#[async_trait]
pub trait ReportServiceTrait: Send + Sync {
    /// Fetches market data for `portfolio` and renders the report.
    async fn generate_report(&self, portfolio: &Portfolio) -> Result<String>;
}

/// Report pipeline: quotes, then indices and news, then valuation,
/// summary and formatting.
///
/// Only one generation runs at a time per service; an overlapping call
/// fails with [`Error::FetchInProgress`].
pub struct ReportService {
    fetcher: Arc<QuoteFetcher>,
    feed: Arc<MarketFeed>,
    formatter: ReportFormatter,
    clock: Arc<dyn Clock>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ReportService {
    pub fn new(
        fetcher: Arc<QuoteFetcher>,
        feed: Arc<MarketFeed>,
        formatter: ReportFormatter,
    ) -> Self {
        Self {
            fetcher,
            feed,
            formatter,
            clock: Arc::new(SystemClock),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::FetchInProgress)?;
        Ok(InFlightGuard(&self.in_flight))
    }

    /// Quotes for every holding, then indices and news together.
    pub async fn fetch_snapshot(&self, portfolio: &Portfolio) -> MarketSnapshot {
        let symbols = portfolio.symbols();
        let quotes = self.fetcher.fetch_quotes(&symbols).await;
        let synthetic = quotes.iter().filter(|q| q.is_synthetic()).count();
        debug!(
            "Fetched {} quotes ({} synthetic)",
            quotes.len(),
            synthetic
        );

        let (indices, news) = self.feed.fetch_market_context().await;
        MarketSnapshot {
            quotes,
            indices,
            news,
        }
    }
}

#[async_trait]
impl ReportServiceTrait for ReportService {
    async fn generate_report(&self, portfolio: &Portfolio) -> Result<String> {
        if portfolio.is_empty() {
            return Err(Error::EmptyPortfolio);
        }
        let _guard = self.acquire()?;

        info!("Generating report for {} holdings", portfolio.len());
        let snapshot = self.fetch_snapshot(portfolio).await;

        let now = self.clock.now();
        let valuation = value_portfolio(portfolio, &snapshot.quotes)?;
        let summary = summarize(&snapshot.quotes, now)?;

        Ok(self
            .formatter
            .format(now, portfolio, &valuation, &snapshot, &summary))
    }
}
