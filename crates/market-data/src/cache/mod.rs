//! Caching layer for market data.
//!
//! A single in-memory TTL cache keyed by (category, key) is shared by the
//! quote fetcher and the index/news feed.

mod quote_cache;

pub use quote_cache::{
    CacheCategory, CachedValue, QuoteCache, SharedQuoteCache, FALLBACK_TTL_SECS, INDEX_TTL_SECS,
    NEWS_TTL_SECS, STOCK_TTL_SECS,
};
