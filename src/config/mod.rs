use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, Result};
use crate::utils::time::localize;

pub mod limits;
pub mod loader;
pub mod validator;

pub use limits::{IntervalLimit, IntervalTable};

pub const CONFIG_PATH_ENV: &str = "NSE_TICKER_CONFIG";
pub const BASE_URL_ENV: &str = "NSE_TICKER_BASE_URL";
pub const TIMEOUT_ENV: &str = "NSE_TICKER_TIMEOUT_SECS";
pub const AUTH_HEADER_ENV: &str = "NSE_TICKER_AUTH_HEADER";

pub const DEFAULT_BASE_URL: &str = "https://groww.in/v1/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub exchange: String,
    pub segment: String,
    pub timezone: Tz,
    pub timeout: Duration,
    /// Sent with every request. Values may embed `${VAR}` placeholders.
    pub headers: BTreeMap<String, String>,
    pub search_page_size: u32,
    pub max_suggestions: usize,
    pub session_open: NaiveTime,
    pub session_close: NaiveTime,
    pub holidays: BTreeSet<NaiveDate>,
    pub intervals: IntervalTable,
}

impl Config {
    pub fn builtin() -> Self {
        let headers = BTreeMap::from([
            (
                "User-Agent".to_string(),
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            ),
            (
                "Accept".to_string(),
                "application/json, text/plain, */*".to_string(),
            ),
            (
                "Accept-Language".to_string(),
                "en-US,en;q=0.9".to_string(),
            ),
        ]);

        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            exchange: "NSE".to_string(),
            segment: "CASH".to_string(),
            timezone: chrono_tz::Asia::Kolkata,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            headers,
            search_page_size: 6,
            max_suggestions: 5,
            session_open: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
            session_close: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
            holidays: BTreeSet::new(),
            intervals: IntervalTable::builtin(),
        }
    }

    /// Load a JSON configuration file layered over the builtin defaults.
    pub fn load(path: &Path) -> Result<Self> {
        loader::load_config(path)
    }

    /// Builtin defaults, or the file named by `NSE_TICKER_CONFIG`, with
    /// individual environment overrides applied on top.
    pub fn from_env() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::builtin(),
        };
        config.apply_overrides(|name| env::var(name).ok())?;
        validator::validate_config(&config)?;
        Ok(config)
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|value| !value.trim().is_empty()) {
            log::debug!("base url overridden from {BASE_URL_ENV}");
            self.base_url = base_url.trim().to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                AppError::configuration(format!(
                    "{TIMEOUT_ENV} must be a whole number of seconds, got `{raw}`"
                ))
            })?;
            self.timeout = Duration::from_secs(secs);
        }

        if let Some(auth) = lookup(AUTH_HEADER_ENV).filter(|value| !value.is_empty()) {
            self.headers.insert("Authorization".to_string(), auth);
        }

        Ok(())
    }

    /// Join a path below the API base url.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn session_open_at(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        localize(&date.and_time(self.session_open), self.timezone)
    }

    pub fn session_close_at(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        localize(&date.and_time(self.session_close), self.timezone)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}
