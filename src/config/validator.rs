use std::collections::BTreeSet;

use crate::error::{AppError, Result};

use super::{Config, IntervalTable};

/// Upper bound for any per-interval day limit, roughly a century.
pub const MAX_LIMIT_DAYS: i64 = 36_500;

/// Validate a configuration and surface every problem in one error.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    validate_endpoint(config, &mut issues);
    validate_limits(config, &mut issues);
    validate_session(config, &mut issues);
    validate_intervals(&config.intervals, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::configuration(format!(
            "config invalid:\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn validate_endpoint(config: &Config, issues: &mut Vec<String>) {
    let base = config.base_url.trim();
    if base.is_empty() {
        issues.push("base_url must not be empty".to_string());
    } else if !(base.starts_with("http://") || base.starts_with("https://")) {
        issues.push(format!("base_url `{base}` must start with http:// or https://"));
    }

    if config.exchange.trim().is_empty() {
        issues.push("exchange must not be empty".to_string());
    }
    if config.segment.trim().is_empty() {
        issues.push("segment must not be empty".to_string());
    }

    for name in config.headers.keys() {
        if name.trim().is_empty() {
            issues.push("header names must not be empty".to_string());
        }
    }
}

fn validate_limits(config: &Config, issues: &mut Vec<String>) {
    if config.timeout.is_zero() {
        issues.push("timeout must be at least one second".to_string());
    }
    if config.search_page_size == 0 {
        issues.push("search_page_size must be positive".to_string());
    }
    if config.max_suggestions == 0 {
        issues.push("max_suggestions must be positive".to_string());
    }
}

fn validate_session(config: &Config, issues: &mut Vec<String>) {
    if config.session_open >= config.session_close {
        issues.push(format!(
            "session opens at {} but closes at {}",
            config.session_open.format("%H:%M"),
            config.session_close.format("%H:%M")
        ));
    }
}

fn validate_intervals(table: &IntervalTable, issues: &mut Vec<String>) {
    if table.entries().is_empty() {
        issues.push("intervals must list at least one candle interval".to_string());
        return;
    }

    let mut seen = BTreeSet::new();
    for entry in table.entries() {
        if entry.minutes == 0 {
            issues.push("interval minutes must be positive".to_string());
        }
        if !seen.insert(entry.minutes) {
            issues.push(format!("interval {} listed more than once", entry.minutes));
        }
        for (field, days) in [
            ("max_lookback_days", entry.max_lookback_days),
            ("max_days_per_request", entry.max_days_per_request),
        ] {
            if days <= 0 {
                issues.push(format!(
                    "interval {} has non-positive {field} {days}",
                    entry.minutes
                ));
            } else if days > MAX_LIMIT_DAYS {
                issues.push(format!(
                    "interval {} has {field} {days}, above the {MAX_LIMIT_DAYS}-day ceiling",
                    entry.minutes
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::IntervalLimit;

    #[test]
    fn aggregates_every_issue() {
        let mut config = Config::builtin();
        config.base_url = "ftp://example".to_string();
        config.timeout = Duration::ZERO;
        config.intervals = IntervalTable::new(vec![
            IntervalLimit {
                minutes: 5,
                max_lookback_days: 0,
                max_days_per_request: 10,
                live: true,
            },
            IntervalLimit {
                minutes: 5,
                max_lookback_days: 10,
                max_days_per_request: 10,
                live: true,
            },
        ]);

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("base_url"));
        assert!(message.contains("timeout"));
        assert!(message.contains("listed more than once"));
        assert!(message.contains("max_lookback_days"));
    }

    #[test]
    fn day_limits_above_the_ceiling_are_rejected() {
        let mut config = Config::builtin();
        config.intervals = IntervalTable::new(vec![IntervalLimit {
            minutes: 15,
            max_lookback_days: 100_000_000_000_000,
            max_days_per_request: MAX_LIMIT_DAYS + 1,
            live: true,
        }]);

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("max_lookback_days 100000000000000"));
        assert!(message.contains("max_days_per_request 36501"));
        assert!(message.contains("ceiling"));
    }

    #[test]
    fn inverted_session_is_rejected() {
        let mut config = Config::builtin();
        std::mem::swap(&mut config.session_open, &mut config.session_close);
        assert!(validate_config(&config).is_err());
    }
}
