use chrono::{DateTime, Utc};
use lotfolio_market_data::Quote;
use rust_decimal::Decimal;

use super::summary_model::{MarketSummary, Performer, Sentiment};
use crate::errors::{CalculatorError, Result};

/// Summarizes `quotes`, which are expected in portfolio order.
///
/// Best and worst keep the first quote seen among equal changes.
pub fn summarize(quotes: &[Quote], calculated_at: DateTime<Utc>) -> Result<MarketSummary> {
    let mut sum = Decimal::ZERO;
    let mut counted: u32 = 0;
    let mut best: Option<Performer> = None;
    let mut worst: Option<Performer> = None;

    for quote in quotes {
        let Some(change) = quote.change_percent else {
            continue;
        };

        sum = sum
            .checked_add(change)
            .ok_or(CalculatorError::TotalOverflow)?;
        counted += 1;

        if best.as_ref().map_or(true, |b| change > b.change_percent) {
            best = Some(Performer {
                symbol: quote.symbol.clone(),
                change_percent: change,
            });
        }
        if worst.as_ref().map_or(true, |w| change < w.change_percent) {
            worst = Some(Performer {
                symbol: quote.symbol.clone(),
                change_percent: change,
            });
        }
    }

    let average_change = if counted == 0 {
        Decimal::ZERO
    } else {
        sum / Decimal::from(counted)
    };

    Ok(MarketSummary {
        average_change,
        sentiment: Sentiment::from_average(average_change),
        best,
        worst,
        quote_count: quotes.len(),
        calculated_at,
    })
}
