use std::collections::HashMap;

use log::debug;
use lotfolio_market_data::Quote;
use rust_decimal::Decimal;

use super::valuation_model::{PortfolioValuation, PositionValuation};
use crate::errors::{CalculatorError, Result};
use crate::portfolio::Portfolio;

/// Values every holding that has a quote with a positive price.
///
/// Holdings without a usable quote are left out. Overflow in any product
/// or in the total is an error.
pub fn value_portfolio(portfolio: &Portfolio, quotes: &[Quote]) -> Result<PortfolioValuation> {
    let mut by_symbol: HashMap<&str, &Quote> = HashMap::with_capacity(quotes.len());
    for quote in quotes {
        by_symbol.entry(quote.symbol.as_str()).or_insert(quote);
    }

    let mut positions = Vec::with_capacity(portfolio.len());
    let mut total_value = Decimal::ZERO;

    for holding in portfolio.iter() {
        let quote = match by_symbol.get(holding.symbol.as_str()) {
            Some(quote) if quote.price > Decimal::ZERO => *quote,
            _ => {
                debug!("No usable quote for {}, skipping", holding.symbol);
                continue;
            }
        };

        let value = quote
            .price
            .checked_mul(Decimal::from(holding.lots))
            .and_then(|v| v.checked_mul(Decimal::from(quote.lot_size)))
            .ok_or_else(|| CalculatorError::Overflow {
                symbol: holding.symbol.clone(),
            })?;

        total_value = total_value
            .checked_add(value)
            .ok_or(CalculatorError::TotalOverflow)?;

        positions.push(PositionValuation {
            symbol: holding.symbol.clone(),
            lots: holding.lots,
            lot_size: quote.lot_size,
            price: quote.price,
            change_percent: quote.change_percent,
            source: quote.source,
            value,
        });
    }

    Ok(PortfolioValuation {
        positions,
        total_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::portfolio::Holding;
    use chrono::{TimeZone, Utc};
    use lotfolio_market_data::{DataQuality, QuoteSource};
    use rust_decimal_macros::dec;

    fn create_test_quote(symbol: &str, price: Decimal, lot_size: u32) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price,
            open: price,
            low: price,
            high: price,
            volume: Decimal::ZERO,
            change: Decimal::ZERO,
            change_percent: Some(Decimal::ZERO),
            lot_size,
            source: QuoteSource::Primary,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            quality: DataQuality::Real,
        }
    }

    fn portfolio(entries: &[(&str, u32)]) -> Portfolio {
        Portfolio::from_holdings(
            entries
                .iter()
                .map(|(symbol, lots)| Holding::new(symbol, *lots).unwrap()),
        )
    }

    #[test]
    fn test_position_value_is_price_times_lots_times_lot_size() {
        let quotes = [create_test_quote("A", dec!(10), 2)];
        let valuation = value_portfolio(&portfolio(&[("A", 3)]), &quotes).unwrap();

        assert_eq!(valuation.get("A").unwrap().value, dec!(60));
        assert_eq!(valuation.get("A").unwrap().shares(), 6);
        assert_eq!(valuation.total_value, dec!(60));
        assert_eq!(valuation.percent_of_total("A"), Some(dec!(100)));
    }

    #[test]
    fn test_symbols_without_usable_quote_are_omitted() {
        let valuation = value_portfolio(
            &portfolio(&[("A", 1), ("B", 1), ("C", 2)]),
            &[
                create_test_quote("A", dec!(5), 1),
                create_test_quote("B", Decimal::ZERO, 1),
                create_test_quote("C", dec!(2.5), 10),
                create_test_quote("X", dec!(100), 1),
            ],
        )
        .unwrap();

        let symbols: Vec<&str> = valuation.positions.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "C"]);
        assert_eq!(valuation.total_value, dec!(55));
        assert!(valuation.percent_of_total("B").is_none());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let result = value_portfolio(
            &portfolio(&[("A", u32::MAX)]),
            &[create_test_quote("A", Decimal::MAX, u32::MAX)],
        );
        assert!(matches!(
            result,
            Err(Error::Calculation(CalculatorError::Overflow { .. }))
        ));
    }

    #[test]
    fn test_empty_valuation_has_no_percentages() {
        let valuation = value_portfolio(&portfolio(&[("A", 1)]), &[]).unwrap();
        assert!(valuation.positions.is_empty());
        assert_eq!(valuation.total_value, Decimal::ZERO);
    }
}
