//! JSON file portfolio store.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_json::Value;

use super::portfolio_model::Portfolio;
use super::portfolio_traits::PortfolioStoreTrait;
use crate::errors::Result;

pub const DEFAULT_PORTFOLIO_PATH: &str = "data/portfolio.json";

/// Stores the portfolio as a JSON object of `symbol -> lots`.
pub struct JsonPortfolioStore {
    path: PathBuf,
}

impl JsonPortfolioStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<Portfolio>> {
        let text = fs::read_to_string(&self.path)?;
        let value: Value = serde_json::from_str(&text)?;
        Ok(Portfolio::from_json_lenient(&value))
    }

    fn write(&self, portfolio: &Portfolio) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(portfolio)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl Default for JsonPortfolioStore {
    fn default() -> Self {
        Self::new(DEFAULT_PORTFOLIO_PATH)
    }
}

impl PortfolioStoreTrait for JsonPortfolioStore {
    fn load(&self) -> Portfolio {
        match self.read() {
            Ok(Some(portfolio)) if !portfolio.is_empty() => {
                debug!(
                    "Loaded {} holdings from {}",
                    portfolio.len(),
                    self.path.display()
                );
                portfolio
            }
            Ok(_) => {
                warn!(
                    "No valid holdings in {}, using default portfolio",
                    self.path.display()
                );
                Portfolio::default_portfolio()
            }
            Err(e) => {
                warn!(
                    "Failed to load portfolio from {}: {}. Using default portfolio",
                    self.path.display(),
                    e
                );
                Portfolio::default_portfolio()
            }
        }
    }

    fn save(&self, portfolio: &Portfolio) -> bool {
        match self.write(portfolio) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save portfolio to {}: {}", self.path.display(), e);
                false
            }
        }
    }
}
