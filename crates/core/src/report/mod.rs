//! Report generation: snapshot fetching, formatting and the single-flight
//! pipeline.

mod number_format;
mod report_formatter;
mod report_model;
mod report_service;


pub use number_format::{GroupedFormat, NumberFormat, NumberStyle, PlainFormat};
pub use report_formatter::{
    section_lines, ReportFormatter, ANALYSIS_PROMPTS, CURRENCY, MISSING, SECTION_MARKET,
    SECTION_NEWS, SECTION_POSITIONS, SECTION_REQUEST, SECTION_STRUCTURE, SECTION_TOTAL, TITLE,
};
pub use report_model::MarketSnapshot;
pub use report_service::{ReportService, ReportServiceTrait};
