use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single market news headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub published_at: DateTime<Utc>,
    pub source: String,
}
