//! Portfolio persistence traits.

use super::portfolio_model::Portfolio;

/// Persisted portfolio blob.
///
/// Loading never fails: a missing or unreadable store yields the default
/// portfolio. Saving reports success as a flag.
pub trait PortfolioStoreTrait: Send + Sync {
    fn load(&self) -> Portfolio;

    /// Replaces the stored portfolio. Returns `false` on failure.
    fn save(&self, portfolio: &Portfolio) -> bool;
}
