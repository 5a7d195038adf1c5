//! Error types for the market data crate.
//!
//! None of these escape [`QuoteFetcher`](crate::QuoteFetcher) or
//! [`MarketFeed`](crate::MarketFeed): every variant is a transient venue
//! failure that moves the fetch to its next fallback stage.

use thiserror::Error;

/// Errors that can occur while talking to a venue or parsing its payload.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The request did not complete within the configured timeout.
    #[error("Timeout: {venue}")]
    Timeout {
        /// The venue that timed out
        venue: String,
    },

    /// The venue answered with a non-success HTTP status.
    #[error("HTTP {status} from {venue}")]
    HttpStatus {
        /// The venue that returned the status
        venue: String,
        /// The HTTP status code
        status: u16,
    },

    /// The payload did not match the expected schema.
    #[error("Parse error from {venue}: {message}")]
    Parse {
        /// The venue that returned the payload
        venue: String,
        /// Description of the schema deviation
        message: String,
    },

    /// The parsed last price was zero or negative.
    #[error("Non-positive price for {symbol}: {price}")]
    InvalidPrice {
        /// Symbol whose quote was rejected
        symbol: String,
        /// The rejected price, as text
        price: String,
    },

    /// The venue does not list the symbol.
    #[error("No data for {symbol} on {venue}")]
    NoData {
        /// The requested symbol
        symbol: String,
        /// The venue that was asked
        venue: String,
    },

    /// The source is not able to serve requests at all.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// A network error occurred while communicating with a venue.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    pub(crate) fn parse(venue: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            venue: venue.to_string(),
            message: message.into(),
        }
    }

    /// Returns true when the venue itself answered and the symbol is simply
    /// not served there.
    pub fn is_not_listed(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MarketDataError::Timeout {
            venue: "TQBR".to_string(),
        };
        assert_eq!(format!("{}", error), "Timeout: TQBR");

        let error = MarketDataError::HttpStatus {
            venue: "FQBR".to_string(),
            status: 503,
        };
        assert_eq!(format!("{}", error), "HTTP 503 from FQBR");

        let error = MarketDataError::InvalidPrice {
            symbol: "SBER".to_string(),
            price: "0".to_string(),
        };
        assert_eq!(format!("{}", error), "Non-positive price for SBER: 0");
    }

    #[test]
    fn test_no_data_is_not_listed() {
        let error = MarketDataError::NoData {
            symbol: "AAPL".to_string(),
            venue: "TQBR".to_string(),
        };
        assert!(error.is_not_listed());
        assert!(!MarketDataError::Unavailable("down".to_string()).is_not_listed());
    }
}
