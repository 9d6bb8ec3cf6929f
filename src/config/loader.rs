use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{AppError, Context, Result};

use super::{validator, Config, IntervalLimit, IntervalTable};

/// Read a JSON config file and layer it over [`Config::builtin`].
pub fn load_config(path: &Path) -> Result<Config> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config JSON at {}", path.display()))?;
    parse_config(&json, &path.display().to_string())
}

pub fn parse_config(json: &str, source: &str) -> Result<Config> {
    let raw: RawConfig = serde_json::from_str(json)
        .with_context(|| format!("failed to parse config JSON at {source}"))?;
    let config = raw.into_config()?;
    validator::validate_config(&config)?;
    Ok(config)
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    segment: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    search_page_size: Option<u32>,
    #[serde(default)]
    max_suggestions: Option<usize>,
    #[serde(default)]
    session: Option<RawSession>,
    #[serde(default)]
    holidays: Vec<String>,
    #[serde(default)]
    intervals: Option<Vec<RawInterval>>,
}

#[derive(Debug, Deserialize)]
struct RawSession {
    open: String,
    close: String,
}

#[derive(Debug, Deserialize)]
struct RawInterval {
    minutes: u32,
    max_lookback_days: i64,
    max_days_per_request: i64,
    #[serde(default = "default_live")]
    live: bool,
}

fn default_live() -> bool {
    true
}

impl RawConfig {
    fn into_config(self) -> Result<Config> {
        let mut config = Config::builtin();

        if let Some(base_url) = self.base_url {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(exchange) = self.exchange {
            config.exchange = exchange.trim().to_uppercase();
        }
        if let Some(segment) = self.segment {
            config.segment = segment.trim().to_uppercase();
        }
        if let Some(timezone) = self.timezone {
            config.timezone = parse_timezone(&timezone)?;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        config.headers.extend(self.headers);
        if let Some(size) = self.search_page_size {
            config.search_page_size = size;
        }
        if let Some(max) = self.max_suggestions {
            config.max_suggestions = max;
        }
        if let Some(session) = self.session {
            config.session_open = parse_session_time("session.open", &session.open)?;
            config.session_close = parse_session_time("session.close", &session.close)?;
        }
        config.holidays = parse_holidays(&self.holidays)?;
        if let Some(intervals) = self.intervals {
            config.intervals = IntervalTable::new(
                intervals
                    .into_iter()
                    .map(RawInterval::into_limit)
                    .collect(),
            );
        }

        Ok(config)
    }
}

impl RawInterval {
    fn into_limit(self) -> IntervalLimit {
        IntervalLimit {
            minutes: self.minutes,
            max_lookback_days: self.max_lookback_days,
            max_days_per_request: self.max_days_per_request,
            live: self.live,
        }
    }
}

fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AppError::configuration(format!("unknown timezone `{name}`")))
}

fn parse_session_time(field: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|err| {
        AppError::configuration(format!("{field} must be HH:MM, got `{value}`: {err}"))
    })
}

fn parse_holidays(values: &[String]) -> Result<BTreeSet<NaiveDate>> {
    values
        .iter()
        .map(|value| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
                AppError::configuration(format!("holiday `{value}` is not YYYY-MM-DD: {err}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_builtin_defaults() {
        let config = parse_config("{}", "inline").unwrap();
        let builtin = Config::builtin();
        assert_eq!(config.base_url, builtin.base_url);
        assert_eq!(config.intervals, builtin.intervals);
        assert!(config.holidays.is_empty());
    }

    #[test]
    fn file_values_layer_over_defaults() {
        let json = r#"{
            "base_url": "http://localhost:8080/v1/api",
            "timezone": "Asia/Kolkata",
            "headers": { "X-Client": "nse-ticker" },
            "session": { "open": "09:00", "close": "15:30" },
            "holidays": ["2024-08-15"],
            "max_suggestions": 3
        }"#;
        let config = parse_config(json, "inline").unwrap();

        assert_eq!(config.base_url, "http://localhost:8080/v1/api");
        assert_eq!(config.headers["X-Client"], "nse-ticker");
        assert!(config.headers.contains_key("User-Agent"));
        assert_eq!(config.session_open, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert!(config
            .holidays
            .contains(&NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()));
        assert_eq!(config.max_suggestions, 3);
    }

    #[test]
    fn custom_interval_table_replaces_builtin() {
        let json = r#"{ "intervals": [
            { "minutes": 1440, "max_lookback_days": 365, "max_days_per_request": 365, "live": false },
            { "minutes": 5, "max_lookback_days": 30, "max_days_per_request": 10 }
        ] }"#;
        let config = parse_config(json, "inline").unwrap();
        assert_eq!(config.intervals.history_minutes(), [5, 1440]);
        assert_eq!(config.intervals.live_minutes(), [5]);
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(parse_config(r#"{ "timezone": "Mars/Olympus" }"#, "inline").is_err());
        assert!(parse_config(r#"{ "holidays": ["15/08/2024"] }"#, "inline").is_err());
        assert!(parse_config(r#"{ "unknown_key": 1 }"#, "inline").is_err());
    }

    #[test]
    fn absurd_interval_limits_fail_to_load() {
        let json = r#"{ "intervals": [
            { "minutes": 15, "max_lookback_days": 100000000000000, "max_days_per_request": 30 }
        ] }"#;
        let message = parse_config(json, "inline").unwrap_err().to_string();
        assert!(message.contains("max_lookback_days"), "{message}");
    }
}
