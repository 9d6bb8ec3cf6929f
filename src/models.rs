use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One OHLCV record for a time bucket. `timestamp` is epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|candle| candle.timestamp);
        candles.dedup_by_key(|candle| candle.timestamp);
        Self { candles }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// Row of the provider's symbol directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub nse_code: Option<String>,
    pub bse_code: Option<String>,
    pub search_id: Option<String>,
    pub title: Option<String>,
    pub entity_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub symbol: String,
    pub title: Option<String>,
    pub score: f64,
}

impl std::fmt::Display for Suggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{} ({})", self.symbol, title),
            None => f.write_str(&self.symbol),
        }
    }
}

/// Identity of a symbol after a successful directory match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSymbol {
    pub symbol: String,
    pub bse_code: Option<String>,
    pub search_id: String,
    /// Provider company id used by the news and events endpoints.
    pub company_id: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub short_name: Option<String>,
    pub company_id: Option<String>,
    pub isin: Option<String>,
    pub nse_code: Option<String>,
    pub bse_code: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub ratios: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub summary: Option<String>,
    pub published_at: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsPage {
    pub page: u32,
    pub size: u32,
    pub items: Vec<NewsItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Dividends,
    Splits,
    Bonuses,
    BoardMeetings,
    Rights,
    Agm,
    Other,
}

impl EventCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventCategory::Dividends => "dividends",
            EventCategory::Splits => "splits",
            EventCategory::Bonuses => "bonuses",
            EventCategory::BoardMeetings => "board_meetings",
            EventCategory::Rights => "rights",
            EventCategory::Agm => "agm",
            EventCategory::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporateEvent {
    pub title: Option<String>,
    pub date: Option<String>,
    pub details: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorporateEvents {
    pub categories: BTreeMap<EventCategory, Vec<CorporateEvent>>,
}

impl CorporateEvents {
    pub fn get(&self, category: EventCategory) -> &[CorporateEvent] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn push(&mut self, category: EventCategory, event: CorporateEvent) {
        self.categories.entry(category).or_default().push(event);
    }

    pub fn total(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}
