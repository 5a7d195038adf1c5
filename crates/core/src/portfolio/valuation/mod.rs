mod valuation_calculator;
mod valuation_model;

pub use valuation_calculator::value_portfolio;
pub use valuation_model::{PortfolioValuation, PositionValuation};
