//! Quote fetcher - cache, board fallback chain and synthetic last resort.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::cache::SharedQuoteCache;
use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::venue::moex::DEFAULT_TIMEOUT_SECS;
use crate::venue::{MoexClient, QuoteVenue, SyntheticQuotes, PRIMARY_BOARD, SECONDARY_BOARD};

/// Resolves a quote for every requested symbol.
///
/// Venues are tried in order; the first one returning a positive price
/// wins. When every venue fails a synthetic quote is produced, so the
/// public operations never fail.
pub struct QuoteFetcher {
    venues: Vec<Arc<dyn QuoteVenue>>,
    synthetic: SyntheticQuotes,
    cache: SharedQuoteCache,
    timeout: Duration,
}

impl QuoteFetcher {
    pub fn new(venues: Vec<Arc<dyn QuoteVenue>>, cache: SharedQuoteCache) -> Self {
        Self {
            venues,
            synthetic: SyntheticQuotes::new(),
            cache,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Fetcher over the primary and secondary ISS boards.
    pub fn moex(client: &MoexClient, cache: SharedQuoteCache) -> Self {
        Self::new(
            vec![
                Arc::new(client.venue(PRIMARY_BOARD)),
                Arc::new(client.venue(SECONDARY_BOARD)),
            ],
            cache,
        )
    }

    pub fn with_synthetic(mut self, synthetic: SyntheticQuotes) -> Self {
        self.synthetic = synthetic;
        self
    }

    /// Upper bound for a single venue call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &SharedQuoteCache {
        &self.cache
    }

    /// Quote for `symbol`, from cache, a venue, or synthesized.
    pub async fn fetch_quote(&self, symbol: &str) -> Quote {
        if let Some(quote) = self.cache.get_quote(symbol) {
            debug!("Cache hit for {}", symbol);
            return quote;
        }

        let quote = match self.fetch_from_venues(symbol).await {
            Some(quote) => quote,
            None => {
                warn!("All venues failed for {}, using synthetic quote", symbol);
                self.synthetic.generate(symbol)
            }
        };

        self.cache.set_quote(&quote);
        quote
    }

    /// Quotes for `symbols`, fetched concurrently, returned in input order.
    pub async fn fetch_quotes(&self, symbols: &[String]) -> Vec<Quote> {
        join_all(symbols.iter().map(|symbol| self.fetch_quote(symbol))).await
    }

    async fn fetch_from_venues(&self, symbol: &str) -> Option<Quote> {
        for venue in &self.venues {
            match self.try_venue(venue.as_ref(), symbol).await {
                Ok(quote) => {
                    debug!("{} quoted {} at {}", venue.id(), symbol, quote.price);
                    return Some(quote);
                }
                Err(e) if e.is_not_listed() => {
                    debug!("{} is not listed on {}", symbol, venue.id());
                }
                Err(e) => {
                    debug!("{} failed for {}: {}", venue.id(), symbol, e);
                }
            }
        }
        None
    }

    async fn try_venue(
        &self,
        venue: &dyn QuoteVenue,
        symbol: &str,
    ) -> Result<Quote, MarketDataError> {
        let quote = tokio::time::timeout(self.timeout, venue.fetch_quote(symbol))
            .await
            .map_err(|_| MarketDataError::Timeout {
                venue: venue.id().to_string(),
            })??;

        if quote.price <= Decimal::ZERO {
            return Err(MarketDataError::InvalidPrice {
                symbol: symbol.to_string(),
                price: quote.price.to_string(),
            });
        }
        Ok(quote)
    }
}
