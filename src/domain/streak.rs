/// Streak calculation
///
/// This module holds the streak engine: a pure function from a set of
/// completed calendar dates and a reference day to the `(current, longest)`
/// streak pair. It performs no I/O and never reads the wall clock, so the
/// caller decides what "today" is and holds it fixed for the whole
/// computation.
///
/// Current streak follows a one-day grace policy: a run that ended yesterday
/// still counts as current while today is not yet marked. Completing neither
/// today nor yesterday reports zero regardless of older history.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

/// The two streak figures derived from a habit's completion history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Streak {
    /// Consecutive completed days ending today or yesterday
    pub current_streak: u32,
    /// Longest run of consecutive completed days in the whole history
    pub longest_streak: u32,
}

impl Streak {
    pub fn new(current_streak: u32, longest_streak: u32) -> Self {
        Self {
            current_streak,
            longest_streak,
        }
    }

    /// Compute both streaks from completed dates in any order
    ///
    /// Duplicates are collapsed, so the result depends only on the set of
    /// dates and never on iteration order.
    pub fn compute<I>(completed_dates: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut dates: Vec<NaiveDate> = completed_dates.into_iter().collect();
        dates.sort_unstable();
        dates.dedup();
        Self::from_sorted(&dates, today)
    }

    /// Compute from dates that are already sorted ascending and unique
    fn from_sorted(dates: &[NaiveDate], today: NaiveDate) -> Self {
        Self {
            current_streak: current_streak(dates, today),
            longest_streak: longest_streak(dates),
        }
    }
}

/// Compute `(current, longest)` for a habit's completed dates
///
/// Only dates whose completion record is marked complete belong in the
/// input. `today` must be captured once by the caller.
pub fn compute_streaks<I>(completed_dates: I, today: NaiveDate) -> Streak
where
    I: IntoIterator<Item = NaiveDate>,
{
    Streak::compute(completed_dates, today)
}

/// Walk backward from today, or yesterday when today is unmarked
fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    if dates.is_empty() {
        return 0;
    }

    let anchor = match dates.binary_search(&today) {
        Ok(index) => index,
        Err(_) => {
            let Some(yesterday) = today.pred_opt() else {
                return 0;
            };
            match dates.binary_search(&yesterday) {
                Ok(index) => index,
                Err(_) => return 0,
            }
        }
    };

    // Unique and sorted, so each step back is consecutive iff it is exactly
    // one day earlier.
    let mut streak = 1;
    let mut index = anchor;
    while index > 0 && dates[index - 1].succ_opt() == Some(dates[index]) {
        streak += 1;
        index -= 1;
    }

    streak
}

/// Single ascending scan tracking the longest consecutive run
fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &date in dates {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    longest
}

/// A habit's completed dates kept sorted for repeated recomputation
///
/// Long histories can keep one of these around instead of re-sorting the
/// full date list after every toggle. Its output is identical to
/// [`compute_streaks`] over the same set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionHistory {
    dates: Vec<NaiveDate>,
}

impl CompletionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from completed dates in any order
    pub fn from_dates<I>(completed_dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut dates: Vec<NaiveDate> = completed_dates.into_iter().collect();
        dates.sort_unstable();
        dates.dedup();
        Self { dates }
    }

    /// Mark a date complete. Returns false if it already was.
    pub fn insert(&mut self, date: NaiveDate) -> bool {
        match self.dates.binary_search(&date) {
            Ok(_) => false,
            Err(index) => {
                self.dates.insert(index, date);
                true
            }
        }
    }

    /// Unmark a date. Returns false if it was not complete.
    pub fn remove(&mut self, date: NaiveDate) -> bool {
        match self.dates.binary_search(&date) {
            Ok(index) => {
                self.dates.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Apply a toggle the same way the store applies it
    pub fn apply(&mut self, date: NaiveDate, completed: bool) -> bool {
        if completed {
            self.insert(date)
        } else {
            self.remove(date)
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.binary_search(&date).is_ok()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Completed dates, ascending
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn streak(&self, today: NaiveDate) -> Streak {
        Streak::from_sorted(&self.dates, today)
    }
}
