//! Lotfolio Core - portfolio model, valuation, market summary and reports.
//!
//! Market data comes from `lotfolio-market-data`; this crate turns a
//! portfolio and the fetched data into a plain-text report.

pub mod errors;
pub mod portfolio;
pub mod report;
pub mod summary;

pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
