//! Moscow Exchange ISS client.
//!
//! This module provides market data from the ISS public API:
//! - Share quotes from the main board (TQBR) and the foreign shares board (FQBR)
//! - Index values (IMOEX, RTSI) from the index analytics market
//!
//! The API needs no key. Endpoints return JSON tables; see [`models`].
//! API documentation: https://iss.moex.com/iss/reference/

pub mod models;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::errors::MarketDataError;
use crate::models::{IndexQuote, MarketIndex, Quote, QuoteSource};
use crate::venue::{IndexSource, QuoteVenue};

use self::models::{parse_index, parse_quote, IndexResponse, SecurityResponse};

pub const ISS_BASE_URL: &str = "https://iss.moex.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Query parameters for a board security request.
pub const QUOTE_QUERY: [(&str, &str); 4] = [
    ("iss.meta", "off"),
    ("iss.only", "securities,marketdata"),
    ("securities.columns", "SECID,PREVPRICE,LOTSIZE"),
    ("marketdata.columns", "LAST,OPEN,LOW,HIGH,VALTODAY,CHANGE"),
];

/// Query parameters for an index analytics request.
pub const INDEX_QUERY: [(&str, &str); 3] = [
    ("iss.meta", "off"),
    ("iss.only", "marketdata"),
    ("marketdata.columns", "CURRENTVALUE,LASTCHANGE"),
];

/// A trading board within an ISS engine/market.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    pub id: &'static str,
    pub engine: &'static str,
    pub market: &'static str,
    pub source: QuoteSource,
}

impl Board {
    fn security_path(&self, symbol: &str) -> String {
        format!(
            "/iss/engines/{}/markets/{}/boards/{}/securities/{}.json",
            self.engine, self.market, self.id, symbol
        )
    }
}

/// Main T+ shares board
pub const PRIMARY_BOARD: Board = Board {
    id: "TQBR",
    engine: "stock",
    market: "shares",
    source: QuoteSource::Primary,
};

/// Foreign shares board
pub const SECONDARY_BOARD: Board = Board {
    id: "FQBR",
    engine: "stock",
    market: "foreignshares",
    source: QuoteSource::Secondary,
};

/// ISS HTTP client.
#[derive(Clone)]
pub struct MoexClient {
    client: Client,
    base_url: String,
    clock: Arc<dyn Clock>,
}

impl MoexClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for quote capture timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request and decode the JSON body.
    async fn fetch<T: DeserializeOwned>(
        &self,
        venue: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MarketDataError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("ISS request: {} ({})", url, venue);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        venue: venue.to_string(),
                    }
                } else {
                    MarketDataError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::HttpStatus {
                venue: venue.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    venue: venue.to_string(),
                }
            } else {
                MarketDataError::Network(e)
            }
        })?;

        serde_json::from_str(&text)
            .map_err(|e| MarketDataError::parse(venue, format!("Failed to decode response: {}", e)))
    }

    /// Fetch and parse a quote for `symbol` from `board`.
    pub async fn fetch_board_quote(
        &self,
        board: &Board,
        symbol: &str,
    ) -> Result<Quote, MarketDataError> {
        let response: SecurityResponse = self
            .fetch(board.id, &board.security_path(symbol), &QUOTE_QUERY)
            .await?;
        parse_quote(symbol, board.source, board.id, &response, self.clock.now())
    }

    /// A [`QuoteVenue`] view of one board.
    pub fn venue(&self, board: Board) -> MoexBoardVenue {
        MoexBoardVenue {
            client: self.clone(),
            board,
        }
    }
}

impl Default for MoexClient {
    fn default() -> Self {
        Self::new(ISS_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

#[async_trait]
impl IndexSource for MoexClient {
    async fn fetch_index(&self, index: MarketIndex) -> Result<IndexQuote, MarketDataError> {
        let path = format!(
            "/iss/engines/stock/markets/index/securities/{}.json",
            index.code()
        );
        let response: IndexResponse = self.fetch(index.code(), &path, &INDEX_QUERY).await?;
        parse_index(index, &response)
    }
}

/// One ISS board exposed as a quote venue.
#[derive(Clone)]
pub struct MoexBoardVenue {
    client: MoexClient,
    board: Board,
}

impl MoexBoardVenue {
    pub fn board(&self) -> &Board {
        &self.board
    }
}

#[async_trait]
impl QuoteVenue for MoexBoardVenue {
    fn id(&self) -> &'static str {
        self.board.id
    }

    fn source(&self) -> QuoteSource {
        self.board.source
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        self.client.fetch_board_quote(&self.board, symbol).await
    }
}
