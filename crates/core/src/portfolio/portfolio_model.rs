//! Portfolio domain models.

use std::fmt;
use std::str::FromStr;

use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::{Result, ValidationError};

/// Portfolio used when the store is missing, unreadable or holds no valid entries.
pub const DEFAULT_PORTFOLIO: [(&str, u32); 4] =
    [("SBER", 10), ("GAZP", 5), ("VTBR", 1000), ("SPBE", 2)];

/// Longest accepted ticker symbol.
pub const MAX_SYMBOL_LEN: usize = 16;

/// One portfolio entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub lots: u32,
}

impl Holding {
    /// Validated holding; the symbol is trimmed and uppercased, and must be at
    /// most [`MAX_SYMBOL_LEN`] characters of `A-Z`, `0-9`, `.`, `_` or `-`.
    pub fn new(symbol: &str, lots: u32) -> Result<Self> {
        let symbol = normalize_symbol(symbol)?;
        if lots == 0 {
            return Err(ValidationError::InvalidLots {
                symbol,
                value: lots.to_string(),
            }
            .into());
        }
        Ok(Self { symbol, lots })
    }
}

impl FromStr for Holding {
    type Err = crate::errors::Error;

    /// Parses `SYMBOL=LOTS`.
    fn from_str(s: &str) -> Result<Self> {
        let (symbol, lots) = s.split_once('=').ok_or_else(|| {
            ValidationError::InvalidInput(format!("expected SYMBOL=LOTS, got '{}'", s))
        })?;
        let lots: u32 = lots.trim().parse().map_err(ValidationError::NumberParse)?;
        Holding::new(symbol, lots)
    }
}

fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ValidationError::EmptySymbol.into());
    }
    let valid_chars = symbol
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'));
    if !valid_chars || symbol.len() > MAX_SYMBOL_LEN {
        return Err(ValidationError::InvalidSymbol(symbol).into());
    }
    Ok(symbol)
}

/// Ordered mapping from ticker symbol to lot count.
///
/// Symbols are unique and every entry has at least one lot. Iteration
/// follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Portfolio {
    holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from validated holdings. A repeated symbol keeps its first entry.
    pub fn from_holdings(holdings: impl IntoIterator<Item = Holding>) -> Self {
        let mut portfolio = Self::new();
        for holding in holdings {
            portfolio.insert(holding);
        }
        portfolio
    }

    pub fn default_portfolio() -> Self {
        Self {
            holdings: DEFAULT_PORTFOLIO
                .iter()
                .map(|(symbol, lots)| Holding {
                    symbol: symbol.to_string(),
                    lots: *lots,
                })
                .collect(),
        }
    }

    /// Lenient conversion from a JSON object of `symbol -> lots`.
    ///
    /// Malformed entries are dropped with a warning: blank or invalid symbols,
    /// non-numeric lots, and lots below one after truncation toward zero.
    /// Returns `None` when the value is not an object.
    pub fn from_json_lenient(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut portfolio = Self::new();
        for (symbol, lots) in object {
            match parse_entry(symbol, lots) {
                Ok(holding) => {
                    if !portfolio.insert(holding) {
                        warn!("Duplicate portfolio symbol '{}' ignored", symbol);
                    }
                }
                Err(reason) => warn!("Discarding portfolio entry {:?}: {}", symbol, reason),
            }
        }
        Some(portfolio)
    }

    /// Adds `holding` unless its symbol is already present.
    fn insert(&mut self, holding: Holding) -> bool {
        if self.contains(&holding.symbol) {
            return false;
        }
        self.holdings.push(holding);
        true
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }

    pub fn lots(&self, symbol: &str) -> Option<u32> {
        self.holdings
            .iter()
            .find(|h| h.symbol == symbol)
            .map(|h| h.lots)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.lots(symbol).is_some()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.iter()
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .holdings
            .iter()
            .map(|h| (h.symbol.clone(), Value::from(h.lots)))
            .collect();
        Value::Object(map)
    }
}

fn parse_entry(symbol: &str, lots: &Value) -> std::result::Result<Holding, String> {
    let number = match lots {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map_err(|e| e.to_string())?,
        other => return Err(format!("lots must be a number, got {}", other)),
    };
    let lots = number
        .trunc()
        .to_u32()
        .ok_or_else(|| format!("lots out of range: {}", number))?;
    Holding::new(symbol, lots).map_err(|e| e.to_string())
}

impl fmt::Display for Portfolio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for holding in &self.holdings {
            writeln!(f, "{}: {} lots", holding.symbol, holding.lots)?;
        }
        Ok(())
    }
}

impl Serialize for Portfolio {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Portfolio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Portfolio::from_json_lenient(&value)
            .ok_or_else(|| serde::de::Error::custom("portfolio must be a JSON object"))
    }
}
