//! Market-wide index values and news, each cached independently.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};

use crate::cache::SharedQuoteCache;
use crate::models::{IndexQuote, IndexSnapshot, MarketIndex, NewsItem};
use crate::news::NewsSource;
use crate::venue::moex::DEFAULT_TIMEOUT_SECS;
use crate::venue::IndexSource;

pub struct MarketFeed {
    indices: Arc<dyn IndexSource>,
    news: Arc<dyn NewsSource>,
    cache: SharedQuoteCache,
    timeout: Duration,
}

impl MarketFeed {
    pub fn new(
        indices: Arc<dyn IndexSource>,
        news: Arc<dyn NewsSource>,
        cache: SharedQuoteCache,
    ) -> Self {
        Self {
            indices,
            news,
            cache,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Values for every [`MarketIndex`]. An index that cannot be fetched
    /// gets its fixed fallback value; this never fails.
    pub async fn fetch_indices(&self) -> IndexSnapshot {
        let entries = join_all(MarketIndex::ALL.iter().map(|index| self.fetch_index(*index))).await;
        IndexSnapshot { entries }
    }

    async fn fetch_index(&self, index: MarketIndex) -> IndexQuote {
        if let Some(cached) = self.cache.get_index(index) {
            return cached;
        }

        let fetched = tokio::time::timeout(self.timeout, self.indices.fetch_index(index)).await;
        let value = match fetched {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!("Index {} unavailable, using fallback: {}", index.code(), e);
                IndexQuote::fallback(index)
            }
            Err(_) => {
                warn!("Index {} timed out, using fallback", index.code());
                IndexQuote::fallback(index)
            }
        };

        self.cache.set_index(&value);
        value
    }

    /// Latest headlines; empty when the source fails.
    pub async fn fetch_news(&self) -> Vec<NewsItem> {
        if let Some(items) = self.cache.get_news() {
            return items;
        }

        match tokio::time::timeout(self.timeout, self.news.fetch_news()).await {
            Ok(Ok(items)) => {
                debug!("Fetched {} news items", items.len());
                self.cache.set_news(&items);
                items
            }
            Ok(Err(e)) => {
                warn!("News unavailable: {}", e);
                Vec::new()
            }
            Err(_) => {
                warn!("News source timed out");
                Vec::new()
            }
        }
    }

    /// Indices and news, fetched together.
    pub async fn fetch_market_context(&self) -> (IndexSnapshot, Vec<NewsItem>) {
        tokio::join!(self.fetch_indices(), self.fetch_news())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QuoteCache;
    use crate::errors::MarketDataError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct MockIndices {
        fail: Vec<MarketIndex>,
        calls: Arc<Mutex<Vec<MarketIndex>>>,
    }

    #[async_trait]
    impl IndexSource for MockIndices {
        async fn fetch_index(&self, index: MarketIndex) -> Result<IndexQuote, MarketDataError> {
            self.calls.lock().unwrap().push(index);
            if self.fail.contains(&index) {
                return Err(MarketDataError::HttpStatus {
                    venue: index.code().to_string(),
                    status: 500,
                });
            }
            Ok(IndexQuote {
                index,
                value: dec!(3000),
                change: Some(dec!(12.5)),
                live: true,
            })
        }
    }

    struct MockNews {
        fail: bool,
        calls: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl NewsSource for MockNews {
        async fn fetch_news(&self) -> Result<Vec<NewsItem>, MarketDataError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(MarketDataError::Unavailable("news".to_string()));
            }
            Ok(vec![NewsItem {
                title: "Headline".to_string(),
                summary: "Body".to_string(),
                published_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
                source: "Desk".to_string(),
            }])
        }
    }

    struct Harness {
        feed: MarketFeed,
        index_calls: Arc<Mutex<Vec<MarketIndex>>>,
        news_calls: Arc<Mutex<usize>>,
    }

    fn harness(failing: Vec<MarketIndex>, news_fails: bool) -> Harness {
        let index_calls = Arc::new(Mutex::new(Vec::new()));
        let news_calls = Arc::new(Mutex::new(0));
        let feed = MarketFeed::new(
            Arc::new(MockIndices {
                fail: failing,
                calls: index_calls.clone(),
            }),
            Arc::new(MockNews {
                fail: news_fails,
                calls: news_calls.clone(),
            }),
            Arc::new(QuoteCache::new()),
        );
        Harness {
            feed,
            index_calls,
            news_calls,
        }
    }

    #[tokio::test]
    async fn test_each_index_falls_back_independently() {
        let h = harness(vec![MarketIndex::Rtsi], false);

        let snapshot = h.feed.fetch_indices().await;
        let imoex = snapshot.get(MarketIndex::Imoex).unwrap();
        let rtsi = snapshot.get(MarketIndex::Rtsi).unwrap();

        assert!(imoex.live);
        assert_eq!(imoex.value, dec!(3000));
        assert!(!rtsi.live);
        assert_eq!(rtsi.value, dec!(1150.00));
        assert_eq!(rtsi.change, Some(Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_indices_are_cached() {
        let h = harness(vec![], false);

        h.feed.fetch_indices().await;
        h.feed.fetch_indices().await;
        assert_eq!(h.index_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_news_failure_yields_empty_and_is_not_cached() {
        let h = harness(vec![], true);

        assert!(h.feed.fetch_news().await.is_empty());
        assert!(h.feed.fetch_news().await.is_empty());
        assert_eq!(*h.news_calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_market_context_fetches_both() {
        let h = harness(vec![], false);

        let (indices, news) = h.feed.fetch_market_context().await;
        assert_eq!(indices.entries.len(), 2);
        assert_eq!(news.len(), 1);

        h.feed.fetch_news().await;
        assert_eq!(*h.news_calls.lock().unwrap(), 1);
    }
}
