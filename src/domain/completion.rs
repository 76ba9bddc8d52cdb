/// CompletionRecord entity for per-day habit marks
///
/// A completion record says whether a habit was performed on one calendar
/// day. There is at most one record per `(habit_id, date)`; toggling a day
/// overwrites the record's `completed` flag instead of adding a new row.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{HabitId, DomainError};

/// Wire and storage format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A per-day mark of whether a habit was performed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// Which habit this record is for
    pub habit_id: HabitId,
    /// The calendar day this record covers (no time of day)
    pub date: NaiveDate,
    /// Whether the habit was performed that day
    pub completed: bool,
    /// When the record was first written
    pub created_at: DateTime<Utc>,
    /// When the record was last toggled
    pub updated_at: DateTime<Utc>,
}

impl CompletionRecord {
    /// Create a record from existing data (used when loading from database)
    pub fn from_existing(
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            habit_id,
            date,
            completed,
            created_at,
            updated_at,
        }
    }
}

/// Parse a canonical `YYYY-MM-DD` calendar date
///
/// Non-padded forms such as `2024-1-5` are rejected so every date has exactly
/// one spelling on the wire and in the database.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, DomainError> {
    let trimmed = input.trim();
    let date = NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(format!("'{}' is not a YYYY-MM-DD date", input)))?;

    if date.format(DATE_FORMAT).to_string() != trimmed {
        return Err(DomainError::InvalidDate(format!(
            "'{}' is not in canonical YYYY-MM-DD form",
            input
        )));
    }

    Ok(date)
}

/// Validate that a toggle date is not after the reference day
pub fn validate_toggle_date(date: NaiveDate, today: NaiveDate) -> Result<(), DomainError> {
    if date > today {
        return Err(DomainError::InvalidDate(format!(
            "Cannot mark {} complete, it is after {}",
            date, today
        )));
    }
    Ok(())
}
