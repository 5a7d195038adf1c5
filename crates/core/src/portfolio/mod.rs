//! Portfolio holdings, persistence and valuation.

mod portfolio_model;
mod portfolio_store;
mod portfolio_traits;
pub mod valuation;

pub use portfolio_model::{Holding, Portfolio, DEFAULT_PORTFOLIO, MAX_SYMBOL_LEN};
pub use portfolio_store::{JsonPortfolioStore, DEFAULT_PORTFOLIO_PATH};
pub use portfolio_traits::PortfolioStoreTrait;
