use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The two market-wide indices shown in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketIndex {
    /// MOEX Russia Index, the broad ruble composite
    Imoex,
    /// RTS Index, the dollar-denominated composite
    Rtsi,
}

impl MarketIndex {
    /// Indices in report order.
    pub const ALL: [MarketIndex; 2] = [MarketIndex::Imoex, MarketIndex::Rtsi];

    /// Exchange security code.
    pub fn code(&self) -> &'static str {
        match self {
            MarketIndex::Imoex => "IMOEX",
            MarketIndex::Rtsi => "RTSI",
        }
    }

    /// Last-known (value, change) used when the index cannot be fetched.
    pub fn fallback(&self) -> (Decimal, Decimal) {
        match self {
            MarketIndex::Imoex => (Decimal::new(325000, 2), Decimal::ZERO),
            MarketIndex::Rtsi => (Decimal::new(115000, 2), Decimal::ZERO),
        }
    }
}

/// Value of one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuote {
    pub index: MarketIndex,
    pub value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,
    /// False when the value is the fixed fallback pair
    pub live: bool,
}

impl IndexQuote {
    pub fn fallback(index: MarketIndex) -> Self {
        let (value, change) = index.fallback();
        Self {
            index,
            value,
            change: Some(change),
            live: false,
        }
    }
}

/// Both index values, in [`MarketIndex::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub entries: Vec<IndexQuote>,
}

impl IndexSnapshot {
    pub fn get(&self, index: MarketIndex) -> Option<&IndexQuote> {
        self.entries.iter().find(|entry| entry.index == index)
    }

    /// Snapshot made entirely of fallback values.
    pub fn fallback() -> Self {
        Self {
            entries: MarketIndex::ALL
                .iter()
                .map(|index| IndexQuote::fallback(*index))
                .collect(),
        }
    }
}
