use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};

/// Source of "now" for window planning.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Answers whether the exchange trades on a given local date.
pub trait TradingCalendar: Send + Sync {
    fn is_trading_day(&self, date: NaiveDate) -> bool;

    /// Short reason for a closed date, used in envelope messages.
    fn closure_reason(&self, date: NaiveDate) -> Option<String> {
        (!self.is_trading_day(date)).then(|| format!("{date} is not a trading day"))
    }
}

/// Monday to Friday, minus an optional set of exchange holidays.
#[derive(Debug, Clone, Default)]
pub struct WeekdayCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl WeekdayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_holidays<I>(holidays: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn is_weekend(date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

impl TradingCalendar for WeekdayCalendar {
    fn is_trading_day(&self, date: NaiveDate) -> bool {
        !Self::is_weekend(date) && !self.holidays.contains(&date)
    }

    fn closure_reason(&self, date: NaiveDate) -> Option<String> {
        if Self::is_weekend(date) {
            Some(format!("{date} falls on a {}; the market is closed", date.weekday()))
        } else if self.holidays.contains(&date) {
            Some(format!("{date} is an exchange holiday; the market is closed"))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekends_and_holidays_are_closed() {
        let independence_day = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        let calendar = WeekdayCalendar::with_holidays([independence_day]);

        let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        assert!(!calendar.is_trading_day(sunday));
        assert!(calendar.is_trading_day(monday));
        assert!(!calendar.is_trading_day(independence_day));
        assert_eq!(
            calendar.closure_reason(sunday).as_deref(),
            Some("2024-06-09 falls on a Sun; the market is closed")
        );
        assert!(calendar.closure_reason(monday).is_none());
    }
}
