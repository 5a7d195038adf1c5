use lotfolio_market_data::{IndexSnapshot, NewsItem, Quote};
use serde::{Deserialize, Serialize};

/// Everything fetched for one report. Built per report; only its parts
/// are cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// Quotes in portfolio order
    pub quotes: Vec<Quote>,
    pub indices: IndexSnapshot,
    pub news: Vec<NewsItem>,
}

impl MarketSnapshot {
    pub fn quote(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.symbol == symbol)
    }
}
