use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Utc};
use lotfolio_core::report::{ReportFormatter, ReportService};
use lotfolio_market_data::{MarketFeed, MoexClient, QuoteCache, QuoteFetcher, StaticNewsSource};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wires the ISS client, cache, fetchers and formatter into a report service.
pub fn build_service(config: &Config) -> ReportService {
    let client = MoexClient::new(config.iss_base_url.clone(), config.request_timeout);
    let cache = Arc::new(QuoteCache::new());

    let fetcher = QuoteFetcher::moex(&client, cache.clone()).with_timeout(config.request_timeout);
    let feed = MarketFeed::new(Arc::new(client), Arc::new(StaticNewsSource::new()), cache)
        .with_timeout(config.request_timeout);
    let formatter =
        ReportFormatter::new(config.number_style.formatter()).with_offset(config.utc_offset);

    tracing::info!("Using ISS at {}", config.iss_base_url);
    ReportService::new(Arc::new(fetcher), Arc::new(feed), formatter)
}

/// `auto_report_YYYYMMDD_HHMM.txt` in the local time of `offset`.
pub fn report_file_name(generated_at: DateTime<Utc>, offset: FixedOffset) -> String {
    format!(
        "auto_report_{}.txt",
        generated_at.with_timezone(&offset).format("%Y%m%d_%H%M")
    )
}

/// Writes `report` into `dir`, creating it if needed.
pub fn save_report(
    dir: &Path,
    report: &str,
    generated_at: DateTime<Utc>,
    offset: FixedOffset,
) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create reports directory {}", dir.display()))?;
    let path = dir.join(report_file_name(generated_at, offset));
    fs::write(&path, report).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
