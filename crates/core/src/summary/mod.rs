//! Cross-portfolio market summary.

mod summary_calculator;
mod summary_model;

pub use summary_calculator::summarize;
pub use summary_model::{MarketSummary, Performer, Sentiment, SENTIMENT_THRESHOLD};
