use crate::error::{AppError, Result};

/// Provider limits for one candle granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalLimit {
    pub minutes: u32,
    /// How far back from today a request may reach.
    pub max_lookback_days: i64,
    /// Longest span a single request may cover before it is split.
    pub max_days_per_request: i64,
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTable {
    entries: Vec<IntervalLimit>,
}

impl IntervalTable {
    pub fn new(mut entries: Vec<IntervalLimit>) -> Self {
        entries.sort_by_key(|entry| entry.minutes);
        Self { entries }
    }

    pub fn builtin() -> Self {
        let limit = |minutes, max_lookback_days, max_days_per_request, live| IntervalLimit {
            minutes,
            max_lookback_days,
            max_days_per_request,
            live,
        };

        Self::new(vec![
            limit(1, 80, 7, true),
            limit(5, 80, 15, true),
            limit(10, 80, 30, true),
            limit(15, 80, 30, true),
            limit(30, 80, 30, true),
            limit(60, 80, 30, true),
            limit(240, 80, 60, true),
            limit(1440, 3650, 1000, false),
        ])
    }

    pub fn entries(&self) -> &[IntervalLimit] {
        &self.entries
    }

    pub fn get(&self, minutes: u32) -> Option<&IntervalLimit> {
        self.entries.iter().find(|entry| entry.minutes == minutes)
    }

    pub fn history_minutes(&self) -> Vec<u32> {
        self.entries.iter().map(|entry| entry.minutes).collect()
    }

    pub fn live_minutes(&self) -> Vec<u32> {
        self.entries
            .iter()
            .filter(|entry| entry.live)
            .map(|entry| entry.minutes)
            .collect()
    }

    pub fn history(&self, minutes: u32) -> Result<&IntervalLimit> {
        self.get(minutes).ok_or_else(|| {
            AppError::configuration(format!(
                "interval {minutes} minutes is not supported; supported intervals: {:?}",
                self.history_minutes()
            ))
        })
    }

    pub fn live(&self, minutes: u32) -> Result<&IntervalLimit> {
        self.get(minutes)
            .filter(|entry| entry.live)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "interval {minutes} minutes is not supported for live data; supported intervals: {:?}",
                    self.live_minutes()
                ))
            })
    }
}

impl Default for IntervalTable {
    fn default() -> Self {
        Self::builtin()
    }
}
