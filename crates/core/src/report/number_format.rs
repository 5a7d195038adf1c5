//! Numeral formatting for report output.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{Error, ValidationError};

/// Renders decimals with a fixed number of fraction digits.
pub trait NumberFormat: Send + Sync {
    fn format(&self, value: Decimal, scale: u32) -> String;

    /// Like [`format`](Self::format) with an explicit `+` on positive values.
    fn format_signed(&self, value: Decimal, scale: u32) -> String {
        let text = self.format(value, scale);
        let rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
        if rounded > Decimal::ZERO {
            format!("+{}", text)
        } else {
            text
        }
    }
}

fn fixed(value: Decimal, scale: u32) -> String {
    let rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    // Avoid "-0.00"
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!("{:.*}", scale as usize, rounded)
}

/// `1234567.89`
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormat;

impl NumberFormat for PlainFormat {
    fn format(&self, value: Decimal, scale: u32) -> String {
        fixed(value, scale)
    }
}

/// Thousands grouping with configurable separators.
#[derive(Debug, Clone, Copy)]
pub struct GroupedFormat {
    group_separator: char,
    decimal_separator: char,
}

impl GroupedFormat {
    pub fn new(group_separator: char, decimal_separator: char) -> Self {
        Self {
            group_separator,
            decimal_separator,
        }
    }

    /// `1 234 567,89`
    pub fn ru() -> Self {
        Self::new(' ', ',')
    }

    /// `1,234,567.89`
    pub fn en() -> Self {
        Self::new(',', '.')
    }
}

impl NumberFormat for GroupedFormat {
    fn format(&self, value: Decimal, scale: u32) -> String {
        let text = fixed(value, scale);
        let (sign, unsigned) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", text.as_str()),
        };
        let (integer, fraction) = match unsigned.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (unsigned, None),
        };

        let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
        for (i, digit) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(digit);
        }

        match fraction {
            Some(fraction) => format!("{}{}{}{}", sign, grouped, self.decimal_separator, fraction),
            None => format!("{}{}", sign, grouped),
        }
    }
}

/// Named numeral styles accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Plain,
    Ru,
    En,
}

impl NumberStyle {
    pub fn formatter(&self) -> Arc<dyn NumberFormat> {
        match self {
            NumberStyle::Plain => Arc::new(PlainFormat),
            NumberStyle::Ru => Arc::new(GroupedFormat::ru()),
            NumberStyle::En => Arc::new(GroupedFormat::en()),
        }
    }
}

impl FromStr for NumberStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(NumberStyle::Plain),
            "ru" => Ok(NumberStyle::Ru),
            "en" => Ok(NumberStyle::En),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown number format '{}', expected plain, ru or en",
                other
            ))
            .into()),
        }
    }
}
