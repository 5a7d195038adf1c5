//! ISS response structures and parsing.
//!
//! With `iss.meta=off` every ISS block is a table of `columns` plus `data`
//! rows. Columns are requested explicitly, so cells are read by position.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{DataQuality, IndexQuote, MarketIndex, Quote, QuoteSource};

// securities.columns=SECID,PREVPRICE,LOTSIZE
const SEC_SECID: usize = 0;
const SEC_PREV_CLOSE: usize = 1;
const SEC_LOT_SIZE: usize = 2;

// marketdata.columns=LAST,OPEN,LOW,HIGH,VALTODAY,CHANGE
const MD_LAST: usize = 0;
const MD_OPEN: usize = 1;
const MD_LOW: usize = 2;
const MD_HIGH: usize = 3;
const MD_VALUE: usize = 4;
const MD_CHANGE: usize = 5;

// marketdata.columns=CURRENTVALUE,LASTCHANGE
const IDX_VALUE: usize = 0;
const IDX_CHANGE: usize = 1;

/// One ISS table block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssTable {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

impl IssTable {
    pub fn first_row(&self) -> Option<&[Value]> {
        self.data.first().map(|row| row.as_slice())
    }
}

/// Response of the board securities endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityResponse {
    pub securities: IssTable,
    #[serde(default)]
    pub marketdata: IssTable,
}

/// Response of the index analytics endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexResponse {
    pub marketdata: IssTable,
}

/// Read a numeric cell. Missing cells and nulls are `None`.
fn cell_decimal(
    row: &[Value],
    idx: usize,
    venue: &str,
) -> Result<Option<Decimal>, MarketDataError> {
    let invalid = |text: String| {
        MarketDataError::parse(venue, format!("invalid number {} at column {}", text, idx))
    };
    match row.get(idx) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => parse_decimal(&n.to_string())
            .map(Some)
            .ok_or_else(|| invalid(n.to_string())),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_decimal(s.trim())
            .map(Some)
            .ok_or_else(|| invalid(format!("'{}'", s))),
        Some(other) => Err(MarketDataError::parse(
            venue,
            format!("unexpected value {} at column {}", other, idx),
        )),
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Parse a board securities response into a [`Quote`].
///
/// Fails when the security record is missing, when it describes a different
/// symbol, or when the resulting last price is not strictly positive.
pub fn parse_quote(
    symbol: &str,
    source: QuoteSource,
    venue: &str,
    response: &SecurityResponse,
    captured_at: DateTime<Utc>,
) -> Result<Quote, MarketDataError> {
    let security = response
        .securities
        .first_row()
        .ok_or_else(|| MarketDataError::NoData {
            symbol: symbol.to_string(),
            venue: venue.to_string(),
        })?;

    if let Some(Value::String(secid)) = security.get(SEC_SECID) {
        if !secid.eq_ignore_ascii_case(symbol) {
            return Err(MarketDataError::parse(
                venue,
                format!("requested {} but received {}", symbol, secid),
            ));
        }
    }

    let prev_close = cell_decimal(security, SEC_PREV_CLOSE, venue)?;
    let market: &[Value] = response.marketdata.first_row().unwrap_or(&[]);

    let price = match cell_decimal(market, MD_LAST, venue)?.or(prev_close) {
        Some(price) if price > Decimal::ZERO => price,
        Some(price) => {
            return Err(MarketDataError::InvalidPrice {
                symbol: symbol.to_string(),
                price: price.to_string(),
            })
        }
        None => {
            return Err(MarketDataError::InvalidPrice {
                symbol: symbol.to_string(),
                price: "null".to_string(),
            })
        }
    };

    let open = cell_decimal(market, MD_OPEN, venue)?.unwrap_or(price);
    let low = cell_decimal(market, MD_LOW, venue)?.unwrap_or(price);
    let high = cell_decimal(market, MD_HIGH, venue)?.unwrap_or(price);
    let volume = cell_decimal(market, MD_VALUE, venue)?.unwrap_or(Decimal::ZERO);
    let change = cell_decimal(market, MD_CHANGE, venue)?.unwrap_or(Decimal::ZERO);

    let lot_size = cell_decimal(security, SEC_LOT_SIZE, venue)?
        .and_then(|lots| lots.trunc().to_u32())
        .filter(|lots| *lots > 0)
        .unwrap_or(1);

    let change_percent = match prev_close {
        Some(prev) if !prev.is_zero() => change
            .checked_div(prev)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    };

    Ok(Quote {
        symbol: symbol.to_string(),
        price,
        open,
        low,
        high,
        volume,
        change,
        change_percent: Some(change_percent),
        lot_size,
        source,
        timestamp: captured_at,
        quality: DataQuality::Real,
    })
}

/// Parse an index analytics response.
pub fn parse_index(
    index: MarketIndex,
    response: &IndexResponse,
) -> Result<IndexQuote, MarketDataError> {
    let venue = index.code();
    let row = response
        .marketdata
        .first_row()
        .ok_or_else(|| MarketDataError::NoData {
            symbol: venue.to_string(),
            venue: "index".to_string(),
        })?;

    let value = cell_decimal(row, IDX_VALUE, venue)?
        .filter(|value| *value > Decimal::ZERO)
        .ok_or_else(|| MarketDataError::parse(venue, "missing index value"))?;
    let change = cell_decimal(row, IDX_CHANGE, venue)?;

    Ok(IndexQuote {
        index,
        value,
        change,
        live: true,
    })
}
