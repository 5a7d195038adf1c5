use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a quote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    /// Main shares board (TQBR)
    Primary,
    /// Foreign shares board (FQBR)
    Secondary,
    /// Fabricated locally when no venue could serve the symbol
    Synthetic,
}

impl QuoteSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteSource::Primary => "primary",
            QuoteSource::Secondary => "secondary",
            QuoteSource::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a quote reflects venue data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Real,
    Synthetic,
}

/// Normalized market data snapshot for one symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Exchange ticker (e.g. "SBER")
    pub symbol: String,

    /// Current (last) price
    pub price: Decimal,

    /// Opening price
    pub open: Decimal,

    /// Session low
    pub low: Decimal,

    /// Session high
    pub high: Decimal,

    /// Traded value for the session
    pub volume: Decimal,

    /// Absolute change against the previous close
    pub change: Decimal,

    /// Percent change against the previous close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<Decimal>,

    /// Shares per lot
    pub lot_size: u32,

    /// Venue tag
    pub source: QuoteSource,

    /// Capture instant
    pub timestamp: DateTime<Utc>,

    /// Real venue data or a synthetic stand-in
    pub quality: DataQuality,
}

impl Quote {
    /// True when the quote came from a venue and carries a usable price.
    pub fn is_real(&self) -> bool {
        self.quality == DataQuality::Real && self.price > Decimal::ZERO
    }

    pub fn is_synthetic(&self) -> bool {
        self.quality == DataQuality::Synthetic
    }
}
