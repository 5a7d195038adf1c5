use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Average change (in percent) above which the market is bullish, and
/// below whose negation it is bearish.
pub const SENTIMENT_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    /// Strict comparison: exactly ±0.5 is neutral.
    pub fn from_average(average: Decimal) -> Self {
        if average > SENTIMENT_THRESHOLD {
            Sentiment::Bullish
        } else if average < -SENTIMENT_THRESHOLD {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Bullish => "BULLISH",
            Sentiment::Bearish => "BEARISH",
            Sentiment::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performer {
    pub symbol: String,
    pub change_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    /// Mean percent change over quotes with a defined change; zero when none.
    pub average_change: Decimal,
    pub sentiment: Sentiment,
    pub best: Option<Performer>,
    pub worst: Option<Performer>,
    pub quote_count: usize,
    pub calculated_at: DateTime<Utc>,
}
