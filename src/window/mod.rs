use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::config::{Config, IntervalLimit};
use crate::error::{AppError, Result};
use crate::utils::time::{format_window_bound, localize, start_of_day};

pub mod calendar;

pub use calendar::{Clock, FixedClock, SystemClock, TradingCalendar, WeekdayCalendar};

pub const DEFAULT_NEWS_PAGE_SIZE: u32 = 5;
pub const MAX_NEWS_PAGE_SIZE: u32 = 50;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open `[start, end)` span for one candle query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval_minutes: u32,
}

impl RequestWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, interval_minutes: u32) -> Result<Self> {
        if start >= end {
            return Err(AppError::configuration(format!(
                "window start {} must be before end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self {
            start,
            end,
            interval_minutes,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn start_millis(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_millis(&self) -> i64 {
        self.end.timestamp_millis()
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Consecutive sub-windows no longer than `max_days` each.
    pub fn split(&self, max_days: i64) -> Vec<RequestWindow> {
        let step = Duration::try_days(max_days.max(1)).unwrap_or_else(|| self.duration());
        let mut batches = Vec::new();
        let mut cursor = self.start;
        while cursor < self.end {
            let next = cursor
                .checked_add_signed(step)
                .map_or(self.end, |next| next.min(self.end));
            batches.push(RequestWindow {
                start: cursor,
                end: next,
                interval_minutes: self.interval_minutes,
            });
            cursor = next;
        }
        batches
    }

    pub fn describe(&self, tz: Tz) -> String {
        format!(
            "[{}, {}) every {} min",
            format_window_bound(self.start, tz),
            format_window_bound(self.end, tz),
            self.interval_minutes
        )
    }
}

/// Arguments for a historical candle query.
///
/// Exactly one of `lookback` or the `start`/`end` pair must be given.
/// `start`/`end` accept `YYYY-MM-DD HH:MM` or `YYYY-MM-DD` in exchange time;
/// a date-only `end` includes that whole day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryOptions {
    pub interval: u32,
    /// Days back from now; `0` means since midnight today.
    pub lookback: Option<i64>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub debug: bool,
}

impl HistoryOptions {
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn lookback(interval: u32, days: i64) -> Self {
        Self {
            lookback: Some(days),
            ..Self::new(interval)
        }
    }

    pub fn range(interval: u32, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            ..Self::new(interval)
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Arguments for a same-day candle query. The trading day check is on by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveOptions {
    pub interval: u32,
    pub check_trading_day: bool,
    pub debug: bool,
}

impl LiveOptions {
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            check_trading_day: true,
            debug: false,
        }
    }

    pub fn with_trading_day_check(mut self, check: bool) -> Self {
        self.check_trading_day = check;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsOptions {
    pub page: u32,
    pub size: u32,
    pub debug: bool,
}

impl Default for NewsOptions {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_NEWS_PAGE_SIZE,
            debug: false,
        }
    }
}

impl NewsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if (1..=MAX_NEWS_PAGE_SIZE).contains(&self.size) {
            Ok(())
        } else {
            Err(AppError::configuration(format!(
                "news page size must be between 1 and {MAX_NEWS_PAGE_SIZE}, got {}",
                self.size
            )))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPlan {
    pub window: RequestWindow,
    /// Sub-windows actually requested, in order.
    pub batches: Vec<RequestWindow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LivePlan {
    Open(RequestWindow),
    /// Nothing to fetch; the reason goes into the envelope.
    Closed { reason: String },
}

/// Turns option structs into validated windows. Performs no I/O.
pub struct WindowPlanner<'a> {
    config: &'a Config,
    clock: &'a dyn Clock,
    calendar: &'a dyn TradingCalendar,
}

impl<'a> WindowPlanner<'a> {
    pub fn new(config: &'a Config, clock: &'a dyn Clock, calendar: &'a dyn TradingCalendar) -> Self {
        Self {
            config,
            clock,
            calendar,
        }
    }

    pub fn plan_history(&self, options: &HistoryOptions) -> Result<HistoryPlan> {
        let limit = self.config.intervals.history(options.interval)?;
        let now = self.clock.now();
        let tz = self.config.timezone;

        let has_range = options.start.is_some() || options.end.is_some();
        let (start, end) = match (options.lookback, has_range) {
            (Some(_), true) => {
                return Err(AppError::configuration(
                    "lookback and start/end are mutually exclusive",
                ))
            }
            (None, false) => {
                return Err(AppError::configuration(
                    "either lookback or both start and end must be given",
                ))
            }
            (Some(days), false) => self.lookback_bounds(days, limit, now)?,
            (None, true) => {
                let (Some(raw_start), Some(raw_end)) = (&options.start, &options.end) else {
                    return Err(AppError::configuration(
                        "start and end must both be given for a date range",
                    ));
                };
                let start = parse_bound(raw_start, false, tz)?;
                let end = parse_bound(raw_end, true, tz)?;
                if start >= end {
                    return Err(AppError::configuration(format!(
                        "start `{raw_start}` must be before end `{raw_end}`"
                    )));
                }
                let earliest = days_before(now, limit.max_lookback_days)?;
                if start < earliest {
                    return Err(AppError::configuration(format!(
                        "start `{raw_start}` is more than {} days back, the limit for {}-minute candles",
                        limit.max_lookback_days, limit.minutes
                    )));
                }
                (start, end)
            }
        };

        let window = RequestWindow::new(start, end, limit.minutes)?;
        let batches = window.split(limit.max_days_per_request);
        Ok(HistoryPlan { window, batches })
    }

    fn lookback_bounds(
        &self,
        days: i64,
        limit: &IntervalLimit,
        now: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        if days < 0 {
            return Err(AppError::configuration(format!(
                "lookback must not be negative, got {days}"
            )));
        }
        if days > limit.max_lookback_days {
            return Err(AppError::configuration(format!(
                "lookback of {days} days exceeds the {}-day limit for {}-minute candles",
                limit.max_lookback_days, limit.minutes
            )));
        }

        let start = if days == 0 {
            let today = now.with_timezone(&self.config.timezone).date_naive();
            let midnight = start_of_day(today, self.config.timezone).ok_or_else(|| {
                AppError::configuration(format!("midnight does not exist on {today}"))
            })?;
            if midnight >= now {
                return Err(AppError::configuration(format!(
                    "lookback 0 covers {today} since midnight, and the day has only just started"
                )));
            }
            midnight
        } else {
            days_before(now, days)?
        };
        Ok((start, now))
    }

    pub fn plan_live(&self, options: &LiveOptions) -> Result<LivePlan> {
        let limit = self.config.intervals.live(options.interval)?;
        let now = self.clock.now();
        let tz = self.config.timezone;
        let today = now.with_timezone(&tz).date_naive();

        if options.check_trading_day {
            if let Some(reason) = self.calendar.closure_reason(today) {
                return Ok(LivePlan::Closed { reason });
            }
        }

        let open = self.config.session_open_at(today).ok_or_else(|| {
            AppError::configuration(format!("session open time does not exist on {today}"))
        })?;
        if now <= open {
            return Ok(LivePlan::Closed {
                reason: format!(
                    "the session opens at {}; no live data yet",
                    format_window_bound(open, tz)
                ),
            });
        }

        let close = self.config.session_close_at(today).ok_or_else(|| {
            AppError::configuration(format!("session close time does not exist on {today}"))
        })?;
        let end = now.min(close);

        Ok(LivePlan::Open(RequestWindow::new(open, end, limit.minutes)?))
    }
}

fn days_before(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| {
            AppError::configuration(format!("{days} days before {now} is out of range"))
        })
}

/// Parse a user-supplied bound in exchange time.
fn parse_bound(raw: &str, is_end: bool, tz: Tz) -> Result<DateTime<Utc>> {
    let text = raw.trim();
    let naive = match NaiveDateTime::parse_from_str(text, DATETIME_FORMAT) {
        Ok(naive) => naive,
        Err(_) => {
            let date = NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| {
                AppError::configuration(format!(
                    "`{raw}` is not a valid datetime; expected YYYY-MM-DD HH:MM or YYYY-MM-DD"
                ))
            })?;
            let date = if is_end {
                date.succ_opt().ok_or_else(|| {
                    AppError::configuration(format!("`{raw}` is out of range"))
                })?
            } else {
                date
            };
            date.and_hms_opt(0, 0, 0).ok_or_else(|| {
                AppError::configuration(format!("`{raw}` is out of range"))
            })?
        }
    };

    localize(&naive, tz).ok_or_else(|| {
        AppError::configuration(format!("`{raw}` does not exist in {}", tz.name()))
    })
}
