//! Portfolio valuation domain models.

use lotfolio_market_data::QuoteSource;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Value of one holding at the current quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub symbol: String,
    pub lots: u32,
    pub lot_size: u32,
    pub price: Decimal,
    pub change_percent: Option<Decimal>,
    pub source: QuoteSource,
    /// price × lots × lot size
    pub value: Decimal,
}

impl PositionValuation {
    /// Number of shares held.
    pub fn shares(&self) -> u64 {
        u64::from(self.lots) * u64::from(self.lot_size)
    }
}

/// Valued positions in portfolio order plus their total.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    pub positions: Vec<PositionValuation>,
    pub total_value: Decimal,
}

impl PortfolioValuation {
    pub fn get(&self, symbol: &str) -> Option<&PositionValuation> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }

    /// Share of the total held in `symbol`, in percent. `None` when the
    /// symbol was not valued or the total is zero.
    pub fn percent_of_total(&self, symbol: &str) -> Option<Decimal> {
        let position = self.get(symbol)?;
        if self.total_value.is_zero() {
            return None;
        }
        position
            .value
            .checked_div(self.total_value)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }
}
