//! Core error types for the Lotfolio application.
//!
//! Transient market data failures never reach this layer; the fetchers
//! recover from them with fallback data. What remains are structural
//! failures that stop a report from being produced.

use std::num::ParseIntError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the report pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Portfolio is empty")]
    EmptyPortfolio,

    #[error("A report is already being generated")]
    FetchInProgress,

    #[error("Valuation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors that occur during portfolio calculations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CalculatorError {
    #[error("Arithmetic overflow valuing {symbol}")]
    Overflow { symbol: String },

    #[error("Arithmetic overflow summing the portfolio total")]
    TotalOverflow,
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("Invalid symbol '{0}': expected up to 16 of A-Z, 0-9, '.', '_' or '-'")]
    InvalidSymbol(String),

    #[error("Lots for {symbol} must be a positive integer, got {value}")]
    InvalidLots { symbol: String, value: String },

    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseIntError),
}

impl Error {
    /// Whether retrying the same call later can succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::FetchInProgress | Error::Io(_))
    }
}
