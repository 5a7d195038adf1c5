//! Plain-text report rendering.
//!
//! Section order is fixed:
//! header, market summary, portfolio structure, position analysis,
//! total value, news (only when non-empty), analysis request.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use lotfolio_market_data::{IndexQuote, MarketIndex};
use rust_decimal::{Decimal, RoundingStrategy};

use super::number_format::{NumberFormat, PlainFormat};
use super::report_model::MarketSnapshot;
use crate::portfolio::valuation::PortfolioValuation;
use crate::portfolio::Portfolio;
use crate::summary::{MarketSummary, Performer, SENTIMENT_THRESHOLD};

/// Rendered in place of any missing number.
pub const MISSING: &str = "N/A";
pub const CURRENCY: &str = "RUB";

pub const TITLE: &str = "AUTOMATED PORTFOLIO REPORT";
pub const SECTION_MARKET: &str = "MARKET SUMMARY";
pub const SECTION_STRUCTURE: &str = "PORTFOLIO STRUCTURE";
pub const SECTION_POSITIONS: &str = "POSITION ANALYSIS";
pub const SECTION_TOTAL: &str = "TOTAL VALUE";
pub const SECTION_NEWS: &str = "MARKET NEWS";
pub const SECTION_REQUEST: &str = "ANALYSIS REQUEST";

pub const ANALYSIS_PROMPTS: [&str; 5] = [
    "Assess diversification and concentration risk across the positions above.",
    "Identify positions whose daily move warrants attention.",
    "Suggest rebalancing actions with target weights.",
    "Note how positions priced from synthetic data affect these conclusions.",
    "Outline the key market drivers to watch over the next week.",
];

const PRICE_SCALE: u32 = 2;
const SUB_UNIT_PRICE_SCALE: u32 = 5;
const PERCENT_SCALE: u32 = 2;
const AVERAGE_DETAIL_SCALE: u32 = 4;

pub struct ReportFormatter {
    numbers: Arc<dyn NumberFormat>,
    offset: FixedOffset,
}

impl ReportFormatter {
    pub fn new(numbers: Arc<dyn NumberFormat>) -> Self {
        Self {
            numbers,
            offset: Utc.fix(),
        }
    }

    /// Offset used to display the generation time.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn format(
        &self,
        generated_at: DateTime<Utc>,
        portfolio: &Portfolio,
        valuation: &PortfolioValuation,
        snapshot: &MarketSnapshot,
        summary: &MarketSummary,
    ) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push(TITLE.to_string());
        lines.push("=".repeat(50));
        lines.push(format!(
            "Generated: {}",
            generated_at
                .with_timezone(&self.offset)
                .format("%Y-%m-%d %H:%M:%S %:z")
        ));

        section(&mut lines, SECTION_MARKET);
        for index in MarketIndex::ALL {
            lines.push(self.index_line(index, snapshot.indices.get(index)));
        }
        lines.push(format!(
            "Average change: {}%",
            self.numbers
                .format_signed(summary.average_change, average_scale(summary.average_change))
        ));
        lines.push(format!("Sentiment: {}", summary.sentiment));
        lines.push(format!("Best performer: {}", self.performer(summary.best.as_ref())));
        lines.push(format!("Worst performer: {}", self.performer(summary.worst.as_ref())));

        section(&mut lines, SECTION_STRUCTURE);
        for holding in portfolio.iter() {
            lines.push(format!("{}: {} lots", holding.symbol, holding.lots));
        }

        section(&mut lines, SECTION_POSITIONS);
        for position in &valuation.positions {
            lines.push(format!(
                "{}: {} lots x {} = {} shares",
                position.symbol,
                position.lots,
                position.lot_size,
                position.shares()
            ));
            lines.push(format!(
                "  Price: {} {} ({})",
                self.numbers.format(position.price, price_scale(position.price)),
                CURRENCY,
                self.percent(position.change_percent)
            ));
            lines.push(format!(
                "  Value: {} {} ({} of total)",
                self.numbers.format(position.value, PRICE_SCALE),
                CURRENCY,
                self.unsigned_percent(valuation.percent_of_total(&position.symbol))
            ));
            lines.push(format!("  Source: {}", position.source));
        }

        lines.push(String::new());
        lines.push(format!(
            "{}: {} {}",
            SECTION_TOTAL,
            self.numbers.format(valuation.total_value, PRICE_SCALE),
            CURRENCY
        ));

        if !snapshot.news.is_empty() {
            section(&mut lines, SECTION_NEWS);
            for (i, item) in snapshot.news.iter().enumerate() {
                lines.push(format!("{}. {}", i + 1, item.title));
                lines.push(format!("   {} ({})", item.summary, item.source));
            }
        }

        section(&mut lines, SECTION_REQUEST);
        for (i, prompt) in ANALYSIS_PROMPTS.iter().enumerate() {
            lines.push(format!("{}. {}", i + 1, prompt));
        }
        lines.push("=".repeat(50));

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    fn index_line(&self, index: MarketIndex, quote: Option<&IndexQuote>) -> String {
        let Some(quote) = quote else {
            return format!("{}: {}", index.code(), MISSING);
        };
        let change = quote
            .change
            .map(|c| self.numbers.format_signed(c, PRICE_SCALE))
            .unwrap_or_else(|| MISSING.to_string());
        let marker = if quote.live { "" } else { " [fallback]" };
        format!(
            "{}: {} ({}){}",
            index.code(),
            self.numbers.format(quote.value, PRICE_SCALE),
            change,
            marker
        )
    }

    fn performer(&self, performer: Option<&Performer>) -> String {
        match performer {
            Some(p) => format!("{} ({})", p.symbol, self.percent(Some(p.change_percent))),
            None => MISSING.to_string(),
        }
    }

    fn percent(&self, value: Option<Decimal>) -> String {
        value
            .map(|v| format!("{}%", self.numbers.format_signed(v, PERCENT_SCALE)))
            .unwrap_or_else(|| MISSING.to_string())
    }

    fn unsigned_percent(&self, value: Option<Decimal>) -> String {
        value
            .map(|v| format!("{}%", self.numbers.format(v, PERCENT_SCALE)))
            .unwrap_or_else(|| MISSING.to_string())
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(Arc::new(PlainFormat))
    }
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(title.to_string());
    lines.push("-".repeat(30));
}

fn price_scale(price: Decimal) -> u32 {
    if price < Decimal::ONE {
        SUB_UNIT_PRICE_SCALE
    } else {
        PRICE_SCALE
    }
}

/// Scale for the average change. An average that would round onto the
/// sentiment threshold without equalling it gets extra digits.
fn average_scale(average: Decimal) -> u32 {
    let magnitude = average.abs();
    let rounded =
        magnitude.round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if rounded == SENTIMENT_THRESHOLD && magnitude != SENTIMENT_THRESHOLD {
        AVERAGE_DETAIL_SCALE
    } else {
        PERCENT_SCALE
    }
}

/// Lines between the heading `title` and the next blank line.
pub fn section_lines<'a>(report: &'a str, title: &str) -> Vec<&'a str> {
    report
        .lines()
        .skip_while(|line| *line != title)
        .skip(2)
        .take_while(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::valuation::value_portfolio;
    use crate::portfolio::Holding;
    use crate::report::number_format::GroupedFormat;
    use crate::summary::summarize;
    use chrono::TimeZone;
    use lotfolio_market_data::{DataQuality, IndexSnapshot, NewsItem, Quote, QuoteSource};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn create_test_quote(
        symbol: &str,
        price: Decimal,
        lot_size: u32,
        change_percent: Option<Decimal>,
        source: QuoteSource,
    ) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            price,
            open: price,
            low: price,
            high: price,
            volume: Decimal::ZERO,
            change: Decimal::ZERO,
            change_percent,
            lot_size,
            source,
            timestamp: now(),
            quality: if source == QuoteSource::Synthetic {
                DataQuality::Synthetic
            } else {
                DataQuality::Real
            },
        }
    }

    fn render(
        snapshot: &MarketSnapshot,
        portfolio: &Portfolio,
        formatter: &ReportFormatter,
    ) -> String {
        let valuation = value_portfolio(portfolio, &snapshot.quotes).unwrap();
        let summary = summarize(&snapshot.quotes, now()).unwrap();
        formatter.format(now(), portfolio, &valuation, snapshot, &summary)
    }

    fn fixture() -> (Portfolio, MarketSnapshot) {
        let portfolio = Portfolio::from_holdings(vec![
            Holding::new("SBER", 10).unwrap(),
            Holding::new("VTBR", 1000).unwrap(),
            Holding::new("GAZP", 5).unwrap(),
        ]);
        let snapshot = MarketSnapshot {
            quotes: vec![
                create_test_quote("SBER", dec!(300), 10, Some(dec!(2)), QuoteSource::Primary),
                create_test_quote("VTBR", dec!(0.025), 10000, None, QuoteSource::Synthetic),
                create_test_quote(
                    "GAZP",
                    Decimal::ZERO,
                    10,
                    Some(dec!(-1)),
                    QuoteSource::Secondary,
                ),
            ],
            indices: IndexSnapshot {
                entries: vec![
                    IndexQuote {
                        index: MarketIndex::Imoex,
                        value: dec!(3201.5),
                        change: Some(dec!(-12.25)),
                        live: true,
                    },
                    IndexQuote::fallback(MarketIndex::Rtsi),
                ],
            },
            news: vec![NewsItem {
                title: "Key rate unchanged".to_string(),
                summary: "The regulator held rates.".to_string(),
                published_at: now(),
                source: "Desk".to_string(),
            }],
        };
        (portfolio, snapshot)
    }

    #[test]
    fn test_full_report() {
        let (portfolio, snapshot) = fixture();
        let report = render(&snapshot, &portfolio, &ReportFormatter::default());

        let expected = "\
AUTOMATED PORTFOLIO REPORT
==================================================
Generated: 2024-03-01 10:00:00 +00:00

MARKET SUMMARY
------------------------------
IMOEX: 3201.50 (-12.25)
RTSI: 1150.00 (0.00) [fallback]
Average change: +0.50%
Sentiment: NEUTRAL
Best performer: SBER (+2.00%)
Worst performer: GAZP (-1.00%)

PORTFOLIO STRUCTURE
------------------------------
SBER: 10 lots
VTBR: 1000 lots
GAZP: 5 lots

POSITION ANALYSIS
------------------------------
SBER: 10 lots x 10 = 100 shares
  Price: 300.00 RUB (+2.00%)
  Value: 30000.00 RUB (10.71% of total)
  Source: primary
VTBR: 1000 lots x 10000 = 10000000 shares
  Price: 0.02500 RUB (N/A)
  Value: 250000.00 RUB (89.29% of total)
  Source: synthetic

TOTAL VALUE: 280000.00 RUB

MARKET NEWS
------------------------------
1. Key rate unchanged
   The regulator held rates. (Desk)

ANALYSIS REQUEST
------------------------------
1. Assess diversification and concentration risk across the positions above.
2. Identify positions whose daily move warrants attention.
3. Suggest rebalancing actions with target weights.
4. Note how positions priced from synthetic data affect these conclusions.
5. Outline the key market drivers to watch over the next week.
==================================================
";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_news_section_omitted_when_empty() {
        let (portfolio, mut snapshot) = fixture();
        snapshot.news.clear();
        let report = render(&snapshot, &portfolio, &ReportFormatter::default());

        assert!(!report.contains(SECTION_NEWS));
        assert!(report.contains("TOTAL VALUE: 280000.00 RUB\n\nANALYSIS REQUEST\n"));
    }

    #[test]
    fn test_missing_values_render_placeholder() {
        let (portfolio, mut snapshot) = fixture();
        snapshot.quotes.clear();
        snapshot.indices.entries.clear();
        let report = render(&snapshot, &portfolio, &ReportFormatter::default());

        assert!(report.contains("IMOEX: N/A\nRTSI: N/A\n"));
        assert!(report.contains("Best performer: N/A\nWorst performer: N/A\n"));
        assert!(section_lines(&report, SECTION_POSITIONS).is_empty());
        assert_eq!(section_lines(&report, SECTION_STRUCTURE).len(), 3);
    }

    #[test]
    fn test_grouped_numbers_and_offset() {
        let (portfolio, snapshot) = fixture();
        let formatter = ReportFormatter::new(Arc::new(GroupedFormat::ru()))
            .with_offset(FixedOffset::east_opt(3 * 3600).unwrap());
        let report = render(&snapshot, &portfolio, &formatter);

        assert!(report.contains("Generated: 2024-03-01 13:00:00 +03:00\n"));
        assert!(report.contains("TOTAL VALUE: 280 000,00 RUB\n"));
        assert!(report.contains("IMOEX: 3 201,50 (-12,25)\n"));
    }

    #[test]
    fn test_structure_has_one_line_per_loaded_holding() {
        let (_, snapshot) = fixture();
        let portfolio = Portfolio::from_json_lenient(&serde_json::json!({
            "SBER": 1,
            "A\n\nPOSITION ANALYSIS": 2,
            "B?iss.only=x": 3
        }))
        .unwrap();

        let report = render(&snapshot, &portfolio, &ReportFormatter::default());
        assert_eq!(section_lines(&report, SECTION_STRUCTURE), vec!["SBER: 1 lots"]);
    }

    #[test]
    fn test_average_near_threshold_keeps_extra_digits() {
        let (portfolio, mut snapshot) = fixture();
        let formatter = ReportFormatter::default();

        snapshot.quotes = vec![create_test_quote(
            "SBER",
            dec!(300),
            10,
            Some(dec!(0.504)),
            QuoteSource::Primary,
        )];
        let report = render(&snapshot, &portfolio, &formatter);
        assert!(report.contains("Average change: +0.5040%\nSentiment: BULLISH\n"));

        snapshot.quotes[0].change_percent = Some(dec!(-0.4951));
        let report = render(&snapshot, &portfolio, &formatter);
        assert!(report.contains("Average change: -0.4951%\nSentiment: NEUTRAL\n"));

        snapshot.quotes[0].change_percent = Some(dec!(1.236));
        let report = render(&snapshot, &portfolio, &formatter);
        assert!(report.contains("Average change: +1.24%\n"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let (portfolio, snapshot) = fixture();
        let formatter = ReportFormatter::default();
        assert_eq!(
            render(&snapshot, &portfolio, &formatter),
            render(&snapshot, &portfolio, &formatter)
        );
    }
}
