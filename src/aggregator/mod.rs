/// Habit aggregator
///
/// The aggregator sits between callers and storage. It owns the toggle
/// operation, keeps each habit's cached streak pair in step with its
/// completion records, and builds the externally visible [`HabitView`]s with
/// their filters and ordering.
///
/// Every operation takes the reference day as an argument. Callers resolve
/// it once per logical operation (see [`crate::DayPolicy`]) and the same
/// value flows through fetching, computing and filtering.

pub mod view;
pub mod filter;
pub mod sort;

pub use view::*;
pub use filter::*;
pub use sort::*;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::domain::{
    compute_streaks, validate_toggle_date, Category, CompletionRecord, DomainError, Habit, HabitId,
    Streak,
};
use crate::storage::{HabitStorage, StorageError};

/// Errors surfaced by aggregator operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Rejected before any computation or write. Never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("Habit not found: {habit_id}")]
    NotFound { habit_id: String },

    /// Persistence failure, propagated unchanged from the store
    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for TrackerError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::HabitNotFound { habit_id } => TrackerError::NotFound { habit_id },
            StorageError::Unsupported(message) => {
                TrackerError::InvalidInput(DomainError::Unsupported(message))
            }
            other => TrackerError::Storage(other),
        }
    }
}

/// Result of a toggle: the stored record and the freshly persisted streaks
#[derive(Debug, Clone, PartialEq)]
pub struct Toggled {
    pub record: CompletionRecord,
    pub streak: Streak,
}

/// How a habit's cached streak pair compared with a fresh computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Consistent,
    /// Advisory only: the cache has already been overwritten
    InconsistentState { cached: Streak },
}

/// Outcome of [`HabitAggregator::verify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakCheck {
    pub streak: Streak,
    pub status: CacheStatus,
}

impl StreakCheck {
    pub fn was_consistent(&self) -> bool {
        self.status == CacheStatus::Consistent
    }
}

/// Metadata changes accepted by [`HabitAggregator::update_habit`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<Category>>,
    pub archived: Option<bool>,
}

/// Composes storage and the streak engine into habit views
pub struct HabitAggregator<S: HabitStorage> {
    storage: S,
    recent_window: RecentWindow,
    refresh_on_read: bool,
    /// One lock per habit so toggle and recompute never interleave for it
    habit_locks: Mutex<HashMap<HabitId, Arc<Mutex<()>>>>,
}

impl<S: HabitStorage> HabitAggregator<S> {
    pub fn new(storage: S, config: &TrackerConfig) -> Self {
        Self {
            storage,
            recent_window: config.recent_window,
            refresh_on_read: config.refresh_on_read,
            habit_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn lock_map(&self) -> MutexGuard<'_, HashMap<HabitId, Arc<Mutex<()>>>> {
        // The guarded data holds no invariants a panic could break
        self.habit_locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn habit_lock(&self, habit_id: &HabitId) -> Arc<Mutex<()>> {
        self.lock_map().entry(habit_id.clone()).or_default().clone()
    }

    /// Forget a habit's lock once nobody else holds or waits on it
    fn release_habit_lock(&self, habit_id: &HabitId, lock: Arc<Mutex<()>>) {
        let mut locks = self.lock_map();
        // One reference in the map plus ours; new clones need the map lock
        if Arc::strong_count(&lock) == 2 {
            locks.remove(habit_id);
        }
    }

    /// Run `f` while holding the habit's lock
    ///
    /// The lock entry lives only as long as some caller is using it.
    fn with_habit_lock<T>(
        &self,
        habit_id: &HabitId,
        f: impl FnOnce() -> Result<T, TrackerError>,
    ) -> Result<T, TrackerError> {
        let lock = self.habit_lock(habit_id);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release_habit_lock(habit_id, lock);
        result
    }

    /// Create a habit with an empty streak cache
    pub fn create_habit(
        &self,
        title: String,
        description: Option<String>,
        category: Option<Category>,
    ) -> Result<Habit, TrackerError> {
        if category.is_some() && !self.storage.capabilities().category_and_archive {
            return Err(DomainError::Unsupported(
                "categories need schema v2; reopen with migrations enabled".to_string()
            )
            .into());
        }

        let habit = Habit::new(title, description, category)?;
        self.storage.create_habit(&habit)?;
        debug!("Created habit {} ({})", habit.title, habit.id);
        Ok(habit)
    }

    /// Change a habit's metadata. Streak caches are not touched.
    pub fn update_habit(&self, habit_id: &HabitId, update: HabitUpdate) -> Result<Habit, TrackerError> {
        let touches_optional = update.category.as_ref().is_some_and(Option::is_some)
            || update.archived == Some(true);
        if touches_optional && !self.storage.capabilities().category_and_archive {
            return Err(DomainError::Unsupported(
                "category and archived need schema v2; reopen with migrations enabled".to_string()
            )
            .into());
        }

        self.with_habit_lock(habit_id, || {
            let mut habit = self.storage.get_habit(habit_id)?;
            habit.update(update.title, update.description, update.category, update.archived)?;
            self.storage.update_habit(&habit)?;
            Ok(habit)
        })
    }

    /// Mark `date` complete or not for a habit, then recompute its streaks
    ///
    /// The record is upserted, so repeating a toggle leaves a single record
    /// and the same streak values. Recomputation always rescans the whole
    /// completion history.
    pub fn toggle(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        completed: bool,
        today: NaiveDate,
    ) -> Result<Toggled, TrackerError> {
        validate_toggle_date(date, today)?;
        // Unknown IDs never reach the lock map
        self.storage.get_habit(habit_id)?;

        self.with_habit_lock(habit_id, || {
            let record = self.storage.upsert_completion(habit_id, date, completed)?;
            let streak = self.recompute_locked(habit_id, today)?;
            debug!(
                "Toggled habit {} on {} to {}: current {}, longest {}",
                habit_id, date, completed, streak.current_streak, streak.longest_streak
            );
            Ok(Toggled { record, streak })
        })
    }

    /// Recompute and persist a habit's streaks from its full history
    pub fn recompute(&self, habit_id: &HabitId, today: NaiveDate) -> Result<Streak, TrackerError> {
        self.with_habit_lock(habit_id, || {
            self.storage.get_habit(habit_id)?;
            self.recompute_locked(habit_id, today)
        })
    }

    /// Compare the cached pair with a fresh computation and repair drift
    ///
    /// A mismatch is reported as [`CacheStatus::InconsistentState`] after the
    /// cache has been overwritten with the fresh values.
    pub fn verify(&self, habit_id: &HabitId, today: NaiveDate) -> Result<StreakCheck, TrackerError> {
        self.with_habit_lock(habit_id, || {
            let cached = self.storage.get_habit(habit_id)?.cached_streak();
            let fresh = compute_streaks(self.storage.fetch_completed_dates(habit_id)?, today);

            if fresh == cached {
                return Ok(StreakCheck {
                    streak: fresh,
                    status: CacheStatus::Consistent,
                });
            }

            warn!(
                "Inconsistent streak cache for habit {}: cached {:?}, fresh {:?}; overwriting",
                habit_id, cached, fresh
            );
            self.storage.persist_streaks(habit_id, fresh)?;
            Ok(StreakCheck {
                streak: fresh,
                status: CacheStatus::InconsistentState { cached },
            })
        })
    }

    /// Caller must hold the habit's lock
    fn recompute_locked(&self, habit_id: &HabitId, today: NaiveDate) -> Result<Streak, TrackerError> {
        let dates = self.storage.fetch_completed_dates(habit_id)?;
        let streak = compute_streaks(dates, today);
        self.storage.persist_streaks(habit_id, streak)?;
        Ok(streak)
    }

    /// Build the view for a single habit
    pub fn view(
        &self,
        habit_id: &HabitId,
        today: NaiveDate,
        window: Option<RecentWindow>,
    ) -> Result<HabitView, TrackerError> {
        let habit = self.storage.get_habit(habit_id)?;
        self.build_view(habit, today, window.unwrap_or(self.recent_window))
    }

    /// List habit views matching `filter`, optionally sorted
    ///
    /// Category and archive filters are pushed down to the store. The full
    /// filter is then applied to the built views, after each view's recent
    /// window is fetched.
    pub fn list(
        &self,
        filter: &FilterSpec,
        sort: Option<&SortSpec>,
        today: NaiveDate,
        window: Option<RecentWindow>,
    ) -> Result<Vec<HabitView>, TrackerError> {
        let window = window.unwrap_or(self.recent_window);
        let habits = self.storage.list_habits(&filter.storage_query())?;

        let mut views = Vec::with_capacity(habits.len());
        for habit in habits {
            views.push(self.build_view(habit, today, window)?);
        }

        let views = apply_filters(views, filter, today)?;
        Ok(match sort {
            Some(spec) => apply_sort(views, spec),
            None => views,
        })
    }

    fn build_view(
        &self,
        mut habit: Habit,
        today: NaiveDate,
        window: RecentWindow,
    ) -> Result<HabitView, TrackerError> {
        if self.refresh_on_read {
            let fresh = compute_streaks(self.storage.fetch_completed_dates(&habit.id)?, today);
            if fresh != habit.cached_streak() {
                // Days passing without toggles make the cached current streak stale
                let check = self.verify(&habit.id, today)?;
                habit.current_streak = check.streak.current_streak;
                habit.longest_streak = check.streak.longest_streak;
            }
        }

        let (window_start, window_end) = window.bounds(today);
        let recent = self
            .storage
            .fetch_recent_completions(&habit.id, window_start, window_end)?;

        Ok(HabitView::new(habit, window_start, window_end, recent))
    }
}
