//! In-memory TTL cache shared across quotes, indices and news.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::clock::{Clock, SystemClock};
use crate::models::{IndexQuote, MarketIndex, NewsItem, Quote};

/// Stock quotes (5 minutes)
pub const STOCK_TTL_SECS: i64 = 300;
/// Index values (5 minutes)
pub const INDEX_TTL_SECS: i64 = 300;
/// News feed (10 minutes)
pub const NEWS_TTL_SECS: i64 = 600;
/// Synthetic quotes and fallback index values (1 minute)
pub const FALLBACK_TTL_SECS: i64 = 60;

const NEWS_KEY: &str = "latest";

/// Cache partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheCategory {
    Stocks,
    Indices,
    News,
}

impl CacheCategory {
    pub fn default_ttl(&self) -> Duration {
        match self {
            CacheCategory::Stocks => Duration::seconds(STOCK_TTL_SECS),
            CacheCategory::Indices => Duration::seconds(INDEX_TTL_SECS),
            CacheCategory::News => Duration::seconds(NEWS_TTL_SECS),
        }
    }
}

impl fmt::Display for CacheCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheCategory::Stocks => f.write_str("stocks"),
            CacheCategory::Indices => f.write_str("indices"),
            CacheCategory::News => f.write_str("news"),
        }
    }
}

/// Payload stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Quote(Quote),
    Index(IndexQuote),
    News(Vec<NewsItem>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    captured_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.captured_at < self.ttl
    }
}

/// TTL cache keyed by (category, key).
///
/// There is no capacity bound; the number of entries is the number of
/// distinct (category, key) pairs seen.
pub struct QuoteCache {
    entries: DashMap<(CacheCategory, String), CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl QuoteCache {
    /// Create a cache that reads the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Store `value` captured now, valid for `ttl`.
    pub fn set(&self, category: CacheCategory, key: &str, value: CachedValue, ttl: Duration) {
        let entry = CacheEntry {
            value,
            captured_at: self.clock.now(),
            ttl,
        };
        self.entries.insert((category, key.to_string()), entry);
    }

    /// Return the payload while it is fresh.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, category: CacheCategory, key: &str) -> Option<CachedValue> {
        let now = self.clock.now();
        let cache_key = (category, key.to_string());

        let fresh = match self.entries.get(&cache_key) {
            Some(entry) if entry.is_fresh(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => return None,
        };

        if fresh.is_none() {
            self.entries
                .remove_if(&cache_key, |_, entry| !entry.is_fresh(now));
        }
        fresh
    }

    pub fn contains(&self, category: CacheCategory, key: &str) -> bool {
        self.entries.contains_key(&(category, key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn get_quote(&self, symbol: &str) -> Option<Quote> {
        match self.get(CacheCategory::Stocks, symbol) {
            Some(CachedValue::Quote(quote)) => Some(quote),
            _ => None,
        }
    }

    /// Cache a quote; synthetic quotes get the short fallback ttl.
    pub fn set_quote(&self, quote: &Quote) {
        let ttl = if quote.is_synthetic() {
            Duration::seconds(FALLBACK_TTL_SECS)
        } else {
            CacheCategory::Stocks.default_ttl()
        };
        self.set(
            CacheCategory::Stocks,
            &quote.symbol,
            CachedValue::Quote(quote.clone()),
            ttl,
        );
    }

    pub fn get_index(&self, index: MarketIndex) -> Option<IndexQuote> {
        match self.get(CacheCategory::Indices, index.code()) {
            Some(CachedValue::Index(value)) => Some(value),
            _ => None,
        }
    }

    /// Cache an index value; fallback values get the short fallback ttl.
    pub fn set_index(&self, value: &IndexQuote) {
        let ttl = if value.live {
            CacheCategory::Indices.default_ttl()
        } else {
            Duration::seconds(FALLBACK_TTL_SECS)
        };
        self.set(
            CacheCategory::Indices,
            value.index.code(),
            CachedValue::Index(value.clone()),
            ttl,
        );
    }

    pub fn get_news(&self) -> Option<Vec<NewsItem>> {
        match self.get(CacheCategory::News, NEWS_KEY) {
            Some(CachedValue::News(items)) => Some(items),
            _ => None,
        }
    }

    pub fn set_news(&self, items: &[NewsItem]) {
        self.set(
            CacheCategory::News,
            NEWS_KEY,
            CachedValue::News(items.to_vec()),
            CacheCategory::News.default_ttl(),
        );
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe handle to a [`QuoteCache`]
pub type SharedQuoteCache = Arc<QuoteCache>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::{DataQuality, QuoteSource};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn create_test_quote(symbol: &str, quality: DataQuality) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price: dec!(280.50),
            open: dec!(279.00),
            low: dec!(278.10),
            high: dec!(281.00),
            volume: dec!(1500000),
            change: dec!(1.50),
            change_percent: Some(dec!(0.54)),
            lot_size: 10,
            source: if quality == DataQuality::Real {
                QuoteSource::Primary
            } else {
                QuoteSource::Synthetic
            },
            timestamp: start(),
            quality,
        }
    }

    fn cache_with_clock() -> (QuoteCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        (QuoteCache::with_clock(clock.clone()), clock)
    }

    #[test]
    fn test_cache_set_get() {
        let (cache, _) = cache_with_clock();
        let quote = create_test_quote("SBER", DataQuality::Real);
        cache.set(
            CacheCategory::Stocks,
            "SBER",
            CachedValue::Quote(quote.clone()),
            Duration::seconds(STOCK_TTL_SECS),
        );

        assert_eq!(
            cache.get(CacheCategory::Stocks, "SBER"),
            Some(CachedValue::Quote(quote))
        );
    }

    #[test]
    fn test_cache_miss() {
        let (cache, _) = cache_with_clock();
        assert!(cache.get(CacheCategory::Stocks, "NONEXISTENT").is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read() {
        let (cache, clock) = cache_with_clock();
        let quote = create_test_quote("SBER", DataQuality::Real);
        cache.set_quote(&quote);

        clock.advance(Duration::seconds(STOCK_TTL_SECS - 1));
        assert!(cache.get_quote("SBER").is_some());

        // Validity is strict: age == ttl is already stale
        clock.advance(Duration::seconds(1));
        assert!(cache.get_quote("SBER").is_none());
        assert!(!cache.contains(CacheCategory::Stocks, "SBER"));
        assert!(cache.is_empty());

        cache.set_quote(&quote);
        assert_eq!(cache.get_quote("SBER"), Some(quote));
    }

    #[test]
    fn test_synthetic_quotes_use_short_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.set_quote(&create_test_quote("GAZP", DataQuality::Synthetic));
        cache.set_quote(&create_test_quote("SBER", DataQuality::Real));

        clock.advance(Duration::seconds(FALLBACK_TTL_SECS));
        assert!(cache.get_quote("GAZP").is_none());
        assert!(cache.get_quote("SBER").is_some());
    }

    #[test]
    fn test_categories_are_separate() {
        let (cache, _) = cache_with_clock();
        cache.set_quote(&create_test_quote("IMOEX", DataQuality::Real));

        assert!(cache.get(CacheCategory::Indices, "IMOEX").is_none());
        assert!(cache.get_index(MarketIndex::Imoex).is_none());
        assert!(cache.get_quote("IMOEX").is_some());
    }

    #[test]
    fn test_index_and_news_ttls() {
        let (cache, clock) = cache_with_clock();
        let live = IndexQuote {
            index: MarketIndex::Imoex,
            value: dec!(3100.25),
            change: Some(dec!(-4.10)),
            live: true,
        };
        cache.set_index(&live);
        cache.set_index(&IndexQuote::fallback(MarketIndex::Rtsi));
        cache.set_news(&[NewsItem {
            title: "Headline".to_string(),
            summary: "Summary".to_string(),
            published_at: start(),
            source: "Desk".to_string(),
        }]);

        clock.advance(Duration::seconds(FALLBACK_TTL_SECS));
        assert_eq!(cache.get_index(MarketIndex::Imoex), Some(live));
        assert!(cache.get_index(MarketIndex::Rtsi).is_none());

        clock.advance(Duration::seconds(INDEX_TTL_SECS));
        assert!(cache.get_index(MarketIndex::Imoex).is_none());
        assert_eq!(cache.get_news().map(|items| items.len()), Some(1));

        clock.advance(Duration::seconds(NEWS_TTL_SECS));
        assert!(cache.get_news().is_none());
    }
}
