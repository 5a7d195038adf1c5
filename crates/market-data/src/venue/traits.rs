//! Venue trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{IndexQuote, MarketIndex, Quote, QuoteSource};

/// A trading board that can quote a single symbol.
///
/// The fetcher asks venues in order and falls through to the next one on
/// any error, so implementations should return an error rather than a
/// quote with a non-positive price.
#[async_trait]
pub trait QuoteVenue: Send + Sync {
    /// Short identifier used in logs (e.g. "TQBR").
    fn id(&self) -> &'static str;

    /// Tag given to quotes from this venue.
    fn source(&self) -> QuoteSource;

    /// Fetch the current quote for `symbol`.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;
}

/// Source of market-wide index values.
#[async_trait]
pub trait IndexSource: Send + Sync {
    async fn fetch_index(&self, index: MarketIndex) -> Result<IndexQuote, MarketDataError>;
}
