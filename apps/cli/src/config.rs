use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::FixedOffset;
use lotfolio_core::report::NumberStyle;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub portfolio_path: PathBuf,
    pub reports_dir: PathBuf,
    pub iss_base_url: String,
    pub request_timeout: Duration,
    pub number_style: NumberStyle,
    pub utc_offset: FixedOffset,
    pub log_format: String,
    pub telegram: Option<TelegramConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let timeout_ms: u64 = var("LF_REQUEST_TIMEOUT_MS", "10000")
            .parse()
            .unwrap_or(10000);
        let number_style: NumberStyle = var("LF_NUMBER_FORMAT", "ru")
            .parse()
            .map_err(|e| anyhow!("Invalid LF_NUMBER_FORMAT: {}", e))?;
        let utc_offset: FixedOffset = var("LF_UTC_OFFSET", "+03:00")
            .parse()
            .context("Invalid LF_UTC_OFFSET, expected e.g. +03:00")?;

        let telegram = match (
            lookup("TELEGRAM_BOT_TOKEN").filter(|v| !v.is_empty()),
            lookup("TELEGRAM_CHAT_ID").filter(|v| !v.is_empty()),
        ) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramConfig {
                bot_token,
                chat_id,
                api_url: var("LF_TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL),
            }),
            _ => None,
        };

        Ok(Self {
            portfolio_path: PathBuf::from(var("LF_PORTFOLIO_PATH", "data/portfolio.json")),
            reports_dir: PathBuf::from(var("LF_REPORTS_DIR", "reports")),
            iss_base_url: var("LF_ISS_BASE_URL", "https://iss.moex.com"),
            request_timeout: Duration::from_millis(timeout_ms),
            number_style,
            utc_offset,
            log_format: var("LF_LOG_FORMAT", "text"),
            telegram,
        })
    }
}
