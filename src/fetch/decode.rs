use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{
    Candle, CompanyInfo, CorporateEvent, CorporateEvents, DirectoryEntry, EventCategory, NewsItem,
};
use crate::utils::normalize_key;

/// Epoch values above this are milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

const RATIO_SECTIONS: &[&str] = &[
    "stats",
    "fundamentals",
    "static_price",
    "price_data",
    "live_price_dto",
];

pub fn parse_json(body: &str, what: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|err| AppError::decode(format!("{what} response is not valid JSON: {err}")))
}

pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn as_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

/// Look up the first alias present on `object`, ignoring key case and separators.
pub fn find_value<'a>(object: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    let map = object.as_object()?;
    for alias in aliases {
        if let Some(value) = map.get(*alias) {
            return Some(value);
        }
        let wanted = normalize_key(alias);
        if let Some((_, value)) = map.iter().find(|(key, _)| normalize_key(key) == wanted) {
            return Some(value);
        }
    }
    None
}

pub fn find_string(object: &Value, aliases: &[&str]) -> Option<String> {
    find_value(object, aliases)
        .filter(|value| !value.is_null() && !value.is_object() && !value.is_array())
        .map(value_to_string)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Search result rows, tried at `data.data.content`, `data.content` and `content`.
pub fn search_content(root: &Value) -> &[Value] {
    let candidates = [
        root.pointer("/data/data/content"),
        root.pointer("/data/content"),
        root.get("content"),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .find(|items| !items.is_empty())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

pub fn directory_entries(root: &Value) -> Vec<DirectoryEntry> {
    search_content(root)
        .iter()
        .filter(|item| item.is_object())
        .map(|item| DirectoryEntry {
            nse_code: find_string(item, &["nse_scrip_code"]),
            bse_code: find_string(item, &["bse_scrip_code"]),
            search_id: find_string(item, &["search_id"]),
            title: find_string(item, &["title", "company_name"]),
            entity_type: find_string(item, &["entity_type"]),
        })
        .collect()
}

/// Company header, at `data.header` or `header`.
pub fn company_header(root: &Value) -> Option<&Value> {
    root.pointer("/data/header")
        .filter(|value| value.is_object())
        .or_else(|| root.get("header").filter(|value| value.is_object()))
}

pub fn company_id(root: &Value) -> Option<String> {
    company_header(root).and_then(|header| find_string(header, &["growwCompanyId"]))
}

pub fn company_info(root: &Value) -> Result<CompanyInfo> {
    let header = company_header(root)
        .ok_or_else(|| AppError::decode("company payload carries no header section"))?;
    let body = root.get("data").filter(|value| value.is_object()).unwrap_or(root);
    let details = find_value(body, &["details"]);

    let lookup = |aliases: &[&str]| {
        find_string(header, aliases)
            .or_else(|| find_string(body, aliases))
            .or_else(|| details.and_then(|details| find_string(details, aliases)))
    };

    let name = lookup(&["displayName", "companyName", "name", "shortName"])
        .ok_or_else(|| AppError::decode("company header carries no name"))?;

    Ok(CompanyInfo {
        name,
        short_name: lookup(&["shortName"]),
        company_id: lookup(&["growwCompanyId"]),
        isin: lookup(&["isin"]),
        nse_code: lookup(&["nseScriptCode", "nseScripCode"]),
        bse_code: lookup(&["bseScriptCode", "bseScripCode"]),
        sector: lookup(&["sector", "sectorName"]),
        industry: lookup(&["industryName", "industry"]),
        ratios: collect_ratios(body),
    })
}

fn collect_ratios(body: &Value) -> BTreeMap<String, f64> {
    let mut ratios = BTreeMap::new();
    for section in RATIO_SECTIONS {
        match find_value(body, &[*section]) {
            Some(Value::Object(map)) => {
                for (key, value) in map {
                    if let Some(number) = as_number(value) {
                        ratios.insert(key.clone(), number);
                    }
                }
            }
            Some(Value::Array(rows)) => {
                for row in rows {
                    let Some(key) = find_string(row, &["name", "title"]) else {
                        continue;
                    };
                    if let Some(number) = find_value(row, &["value"]).and_then(as_number) {
                        ratios.insert(key, number);
                    }
                }
            }
            _ => {}
        }
    }
    ratios
}

/// Decode `[ts, o, h, l, c, v]` rows; malformed rows are skipped.
pub fn candles(root: &Value) -> Result<Vec<Candle>> {
    let rows = root
        .get("candles")
        .or_else(|| root.pointer("/data/candles"))
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::decode("chart payload carries no `candles` array"))?;

    let mut candles = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match parse_candle(row) {
            Some(candle) => candles.push(candle),
            None => log::warn!("skipping malformed candle row {index}: {row}"),
        }
    }
    Ok(candles)
}

fn parse_candle(row: &Value) -> Option<Candle> {
    let fields = row.as_array()?;
    if fields.len() != 6 {
        return None;
    }
    let numbers = fields.iter().map(as_number).collect::<Option<Vec<f64>>>()?;

    let raw_ts = numbers[0] as i64;
    let timestamp = if raw_ts > MILLIS_THRESHOLD {
        raw_ts / 1000
    } else {
        raw_ts
    };

    Some(Candle {
        timestamp,
        open: numbers[1],
        high: numbers[2],
        low: numbers[3],
        close: numbers[4],
        volume: numbers[5],
    })
}

pub fn news_items(root: &Value) -> Result<Vec<NewsItem>> {
    let items = root
        .get("results")
        .or_else(|| root.get("content"))
        .or_else(|| root.pointer("/data/results"))
        .and_then(Value::as_array)
        .or_else(|| root.as_array())
        .ok_or_else(|| AppError::decode("news payload carries no item list"))?;

    Ok(items.iter().filter_map(parse_news_item).collect())
}

fn parse_news_item(item: &Value) -> Option<NewsItem> {
    let nested = item.get("data").filter(|value| value.is_object());
    let lookup = |aliases: &[&str]| {
        find_string(item, aliases).or_else(|| nested.and_then(|data| find_string(data, aliases)))
    };

    let Some(headline) = lookup(&["title", "headline"]) else {
        log::warn!("skipping news item without a headline");
        return None;
    };

    Some(NewsItem {
        headline,
        summary: lookup(&["summary", "description", "snippet"]),
        published_at: lookup(&["pubDate", "publishedAt", "createdAt", "date"]),
        url: lookup(&["url", "link", "newsUrl"]),
        source: lookup(&["source", "publisher", "sourceName"]),
    })
}

pub fn corporate_events(root: &Value) -> Result<CorporateEvents> {
    let body = root
        .get("data")
        .filter(|value| value.is_object() || value.is_array())
        .unwrap_or(root);

    let mut events = CorporateEvents::default();
    match body {
        Value::Array(items) => {
            for item in items {
                events.push(category_of_item(item), corporate_event(item));
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                let Some(items) = value.as_array() else {
                    continue;
                };
                let section = categorize(key);
                for item in items {
                    let category = match section {
                        EventCategory::Other => category_of_item(item),
                        known => known,
                    };
                    events.push(category, corporate_event(item));
                }
            }
        }
        _ => return Err(AppError::decode("events payload is neither an object nor a list")),
    }
    Ok(events)
}

fn category_of_item(item: &Value) -> EventCategory {
    find_string(item, &["type", "eventType", "actionType", "purpose"])
        .map(|kind| categorize(&kind))
        .unwrap_or(EventCategory::Other)
}

fn categorize(label: &str) -> EventCategory {
    let key = normalize_key(label);
    if key.contains("dividend") {
        EventCategory::Dividends
    } else if key.contains("split") {
        EventCategory::Splits
    } else if key.contains("bonus") {
        EventCategory::Bonuses
    } else if key.contains("board") || (key.contains("meeting") && !key.contains("general")) {
        EventCategory::BoardMeetings
    } else if key.contains("right") {
        EventCategory::Rights
    } else if key.contains("agm") || key.contains("egm") || key.contains("generalmeeting") {
        EventCategory::Agm
    } else {
        EventCategory::Other
    }
}

fn corporate_event(item: &Value) -> CorporateEvent {
    CorporateEvent {
        title: find_string(item, &["title", "purpose", "subject", "eventType", "type"]),
        date: find_string(
            item,
            &["exDate", "eventDate", "recordDate", "meetingDate", "date", "announcementDate"],
        ),
        details: item.clone(),
    }
}
