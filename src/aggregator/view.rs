/// Externally visible habit records
///
/// A [`HabitView`] is a habit's static fields, its streak pair and the
/// completion records inside a bounded window ending at the reference day.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::domain::{CompletionRecord, DomainError, Habit};

/// Default number of days a view's recent window covers
pub const DEFAULT_RECENT_DAYS: u32 = 14;
/// Upper bound for a recent window
pub const MAX_RECENT_DAYS: u32 = 365;

/// The last N days ending at the reference day, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentWindow {
    days: u32,
}

impl RecentWindow {
    /// A window of `days` days. Anything outside `1..=365` is rejected,
    /// since a window shorter than one day cannot contain today.
    pub fn new(days: i64) -> Result<Self, DomainError> {
        if days < 1 || days > MAX_RECENT_DAYS as i64 {
            return Err(DomainError::InvalidWindow(format!(
                "recent window must be between 1 and {} days, got {}",
                MAX_RECENT_DAYS, days
            )));
        }
        Ok(Self { days: days as u32 })
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Inclusive `(start, end)` dates of the window ending at `today`
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today - Duration::days(i64::from(self.days) - 1);
        (start, today)
    }
}

impl Default for RecentWindow {
    fn default() -> Self {
        Self {
            days: DEFAULT_RECENT_DAYS,
        }
    }
}

/// A habit as presented to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    /// First day of the recent window
    pub window_start: NaiveDate,
    /// Last day of the recent window (the reference day it was built for)
    pub window_end: NaiveDate,
    /// Completion records inside the window, newest first
    pub recent_completions: Vec<CompletionRecord>,
}

impl HabitView {
    pub fn new(
        habit: Habit,
        window_start: NaiveDate,
        window_end: NaiveDate,
        recent_completions: Vec<CompletionRecord>,
    ) -> Self {
        Self {
            habit,
            window_start,
            window_end,
            recent_completions,
        }
    }

    /// Whether the recent window holds a completed record for `day`
    ///
    /// Only the window is consulted, never the full history, so `day` must
    /// fall inside it.
    pub fn completed_on(&self, day: NaiveDate) -> Result<bool, DomainError> {
        if day < self.window_start || day > self.window_end {
            return Err(DomainError::InvalidWindow(format!(
                "{} is outside the recent window {}..={} of habit {}",
                day, self.window_start, self.window_end, self.habit.id
            )));
        }

        Ok(self
            .recent_completions
            .iter()
            .any(|record| record.date == day && record.completed))
    }
}
