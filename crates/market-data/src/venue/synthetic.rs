//! Synthetic quote generator.
//!
//! Used as the last stage of the fallback chain when no board returns a
//! usable quote. Prices are a small random walk around a fixed base price.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::clock::{Clock, SystemClock};
use crate::models::{DataQuality, Quote, QuoteSource};

/// Base price for symbols missing from [`BASE_PRICES`].
pub const DEFAULT_BASE_PRICE: Decimal = Decimal::ONE_HUNDRED;

/// (symbol, base price in minor units of 1e-4, lot size)
const BASE_PRICES: &[(&str, i64, u32)] = &[
    ("SBER", 2_800_000, 10),
    ("GAZP", 1_600_000, 10),
    ("VTBR", 250, 10_000),
    ("SPBE", 2_500_000, 1),
    ("LKOH", 70_000_000, 1),
    ("ROSN", 5_500_000, 1),
    ("GMKN", 1_600_000, 10),
    ("NVTK", 11_000_000, 1),
    ("MGNT", 55_000_000, 1),
    ("YDEX", 40_000_000, 1),
];

/// Max deviation of the price from its base, in basis points.
const PRICE_SPREAD_BPS: i64 = 200;
/// Max deviation of open/low/high from the price, in basis points.
const RANGE_SPREAD_BPS: i64 = 100;

/// Base price and lot size for `symbol`.
pub fn base_price(symbol: &str) -> (Decimal, u32) {
    BASE_PRICES
        .iter()
        .find(|(known, _, _)| *known == symbol)
        .map(|(_, minor, lot)| (Decimal::new(*minor, 4), *lot))
        .unwrap_or((DEFAULT_BASE_PRICE, 1))
}

fn shift(value: Decimal, bps: i64) -> Decimal {
    value + value * Decimal::new(bps, 4)
}

/// Generates tagged synthetic quotes.
pub struct SyntheticQuotes {
    rng: Mutex<StdRng>,
    clock: Arc<dyn Clock>,
}

impl SyntheticQuotes {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Reproducible generator for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Fabricate a quote for `symbol`.
    pub fn generate(&self, symbol: &str) -> Quote {
        let (base, lot_size) = base_price(symbol);
        let scale = if base < Decimal::ONE { 5 } else { 2 };

        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let price_bps = rng.gen_range(-PRICE_SPREAD_BPS..=PRICE_SPREAD_BPS);
        let price = shift(base, price_bps).round_dp(scale);
        let open_bps = rng.gen_range(-RANGE_SPREAD_BPS..=RANGE_SPREAD_BPS);
        let open = shift(price, open_bps).round_dp(scale);
        let low = shift(price.min(open), -rng.gen_range(0..=RANGE_SPREAD_BPS)).round_dp(scale);
        let high = shift(price.max(open), rng.gen_range(0..=RANGE_SPREAD_BPS)).round_dp(scale);
        let volume = Decimal::from(rng.gen_range(1_000_000_i64..=100_000_000));
        drop(rng);

        let change = price - base;
        let change_percent = change
            .checked_div(base)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(|pct| pct.round_dp(2));

        Quote {
            symbol: symbol.to_string(),
            price,
            open,
            low,
            high,
            volume,
            change,
            change_percent,
            lot_size,
            source: QuoteSource::Synthetic,
            timestamp: self.clock.now(),
            quality: DataQuality::Synthetic,
        }
    }
}

impl Default for SyntheticQuotes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_known_symbol_stays_near_base() {
        let synthetic = SyntheticQuotes::with_seed(7);
        for _ in 0..50 {
            let quote = synthetic.generate("SBER");
            assert!(quote.price >= dec!(274.40) && quote.price <= dec!(285.60));
            assert!(quote.low <= quote.price && quote.price <= quote.high);
            assert!(quote.low <= quote.open && quote.open <= quote.high);
            assert_eq!(quote.lot_size, 10);
            assert_eq!(quote.source, QuoteSource::Synthetic);
            assert!(quote.is_synthetic());
        }
    }

    #[test]
    fn test_unknown_symbol_uses_default_base() {
        let quote = SyntheticQuotes::with_seed(1).generate("ZZZZ");
        assert!(quote.price >= dec!(98) && quote.price <= dec!(102));
        assert_eq!(quote.lot_size, 1);
        assert_eq!(base_price("ZZZZ"), (dec!(100), 1));
    }

    #[test]
    fn test_sub_ruble_prices_keep_precision() {
        let quote = SyntheticQuotes::with_seed(3).generate("VTBR");
        assert!(quote.price > Decimal::ZERO);
        assert!(quote.price >= dec!(0.0245) && quote.price <= dec!(0.0255));
    }

    #[test]
    fn test_same_seed_same_prices() {
        let a = SyntheticQuotes::with_seed(42).generate("GAZP");
        let b = SyntheticQuotes::with_seed(42).generate("GAZP");
        assert_eq!(a.price, b.price);
        assert_eq!(a.volume, b.volume);
    }
}
