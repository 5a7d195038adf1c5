//! Quote venues.
//!
//! - [`moex`]: the exchange's ISS boards and index analytics
//! - [`synthetic`]: last-resort generated quotes

pub mod moex;
pub mod synthetic;
mod traits;

pub use moex::{Board, MoexBoardVenue, MoexClient, PRIMARY_BOARD, SECONDARY_BOARD};
pub use synthetic::SyntheticQuotes;
pub use traits::{IndexSource, QuoteVenue};
