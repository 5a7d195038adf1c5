//! Market news sources.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;

use crate::clock::{Clock, SystemClock};
use crate::errors::MarketDataError;
use crate::models::NewsItem;

/// Source of market headlines, newest first.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_news(&self) -> Result<Vec<NewsItem>, MarketDataError>;
}

const STATIC_HEADLINES: [(&str, &str, i64); 3] = [
    (
        "Central bank keeps key rate unchanged",
        "The regulator held the key rate and signalled a cautious easing path.",
        1,
    ),
    (
        "Oil and gas exporters lead the session",
        "Energy names outperformed the broad index on firmer Brent prices.",
        3,
    ),
    (
        "Bank dividends in focus ahead of record dates",
        "Investors are positioning in large banks before upcoming dividend cut-offs.",
        6,
    ),
];

/// Fixed headline set stamped relative to the current time.
pub struct StaticNewsSource {
    clock: Arc<dyn Clock>,
    source: String,
}

impl StaticNewsSource {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            source: "Market Desk".to_string(),
        }
    }
}

impl Default for StaticNewsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsSource for StaticNewsSource {
    async fn fetch_news(&self) -> Result<Vec<NewsItem>, MarketDataError> {
        let now = self.clock.now();
        Ok(STATIC_HEADLINES
            .iter()
            .map(|(title, summary, hours_ago)| NewsItem {
                title: title.to_string(),
                summary: summary.to_string(),
                published_at: now - Duration::hours(*hours_ago),
                source: self.source.clone(),
            })
            .collect())
    }
}
