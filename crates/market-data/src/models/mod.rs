//! Market data models.

mod index;
mod news;
mod quote;

pub use index::{IndexQuote, IndexSnapshot, MarketIndex};
pub use news::NewsItem;
pub use quote::{DataQuality, Quote, QuoteSource};
