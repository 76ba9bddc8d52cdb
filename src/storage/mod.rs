/// Storage layer for persisting habit data
///
/// This module defines the accessor contract the aggregator consumes and a
/// SQLite implementation of it. The streak engine never talks to storage;
/// the aggregator fetches dates, runs the engine, and persists the result.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;
pub use migrations::SchemaCapabilities;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;
use crate::domain::{Category, CompletionRecord, Habit, HabitId, Streak};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Unsupported by database schema: {0}")]
    Unsupported(String),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Static metadata filters that can be pushed down to the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitQuery {
    pub category: Option<Category>,
    pub archived: Option<bool>,
}

impl HabitQuery {
    /// Whether the query needs the optional category/archive columns
    pub fn uses_optional_columns(&self) -> bool {
        self.category.is_some() || self.archived.is_some()
    }
}

/// Trait defining the storage interface for habits and completions
///
/// Implementations must enforce one completion record per
/// `(habit_id, date)`. All methods are synchronous; the aggregator awaits
/// nothing else.
pub trait HabitStorage: Send + Sync {
    /// Optional schema features resolved when the store was opened
    fn capabilities(&self) -> SchemaCapabilities;

    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Update a habit's metadata. Cached streaks are left untouched.
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// List habits matching the static filters, oldest first
    fn list_habits(&self, query: &HabitQuery) -> Result<Vec<Habit>, StorageError>;

    /// Every date marked complete for a habit
    fn fetch_completed_dates(&self, habit_id: &HabitId) -> Result<BTreeSet<NaiveDate>, StorageError>;

    /// Insert or overwrite the record for `(habit_id, date)`
    ///
    /// Repeating a call with the same arguments only refreshes `updated_at`.
    fn upsert_completion(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        completed: bool,
    ) -> Result<CompletionRecord, StorageError>;

    /// Overwrite both cached streak values in one write
    fn persist_streaks(&self, habit_id: &HabitId, streak: Streak) -> Result<(), StorageError>;

    /// Records dated within `[window_start, window_end]`, newest first
    fn fetch_recent_completions(
        &self,
        habit_id: &HabitId,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, StorageError>;
}
