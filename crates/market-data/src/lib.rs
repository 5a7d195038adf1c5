//! Lotfolio Market Data Crate
//!
//! This crate fetches Moscow Exchange market data for the Lotfolio report
//! generator.
//!
//! # Overview
//!
//! - Share quotes from the main board with a foreign-shares board fallback
//! - Synthetic quotes when no board answers, clearly tagged as such
//! - Index values (IMOEX, RTSI) with fixed fallbacks
//! - A pluggable news source
//! - A shared in-memory TTL cache
//!
//! # Architecture
//!
//! ```text
//! +------------------+        +------------------+
//! |   QuoteFetcher   |        |    MarketFeed    |
//! +------------------+        +------------------+
//!     |         |                 |          |
//!     v         v                 v          v
//! +-------+ +-----------+   +-----------+ +------------+
//! | Cache | |  Venues   |   |IndexSource| | NewsSource |
//! +-------+ | TQBR/FQBR |   |  (ISS)    | |  (static)  |
//!           +-----------+   +-----------+ +------------+
//!                |
//!                v
//!           +-----------+
//!           | Synthetic |
//!           +-----------+
//! ```

pub mod cache;
pub mod clock;
pub mod errors;
pub mod feed;
pub mod fetcher;
pub mod models;
pub mod news;
pub mod venue;

pub use cache::{CacheCategory, CachedValue, QuoteCache, SharedQuoteCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::MarketDataError;
pub use feed::MarketFeed;
pub use fetcher::QuoteFetcher;
pub use models::{
    DataQuality, IndexQuote, IndexSnapshot, MarketIndex, NewsItem, Quote, QuoteSource,
};
pub use news::{NewsSource, StaticNewsSource};
pub use venue::{
    IndexSource, MoexBoardVenue, MoexClient, QuoteVenue, SyntheticQuotes, PRIMARY_BOARD,
    SECONDARY_BOARD,
};
