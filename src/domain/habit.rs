/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a user's habit
/// they want to track, along with its validation rules.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{Category, HabitId, DomainError, Streak};

/// A habit represents something the user wants to do every day
///
/// `current_streak` and `longest_streak` are a cache of the streak engine's
/// output over the habit's completion records. Only the aggregator's
/// recompute step writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display title (e.g., "Morning Run", "Read for 30min")
    pub title: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Optional category for organization
    pub category: Option<Category>,
    /// Archived habits are kept but hidden by the usual listing filters
    pub archived: bool,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Cached current streak
    pub current_streak: u32,
    /// Cached longest streak
    pub longest_streak: u32,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// New habits start unarchived with an empty streak cache.
    pub fn new(
        title: String,
        description: Option<String>,
        category: Option<Category>,
    ) -> Result<Self, DomainError> {
        let title = Self::validate_title(&title)?;
        Self::validate_description(&description)?;

        Ok(Self {
            id: HabitId::new(),
            title,
            description,
            category,
            archived: false,
            created_at: Utc::now(),
            current_streak: 0,
            longest_streak: 0,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        title: String,
        description: Option<String>,
        category: Option<Category>,
        archived: bool,
        created_at: DateTime<Utc>,
        current_streak: u32,
        longest_streak: u32,
    ) -> Self {
        Self {
            id,
            title,
            description,
            category,
            archived,
            created_at,
            current_streak,
            longest_streak,
        }
    }

    /// Update the habit's metadata with validation
    ///
    /// Nothing is applied unless every supplied value is valid.
    pub fn update(
        &mut self,
        title: Option<String>,
        description: Option<Option<String>>,
        category: Option<Option<Category>>,
        archived: Option<bool>,
    ) -> Result<(), DomainError> {
        let title = match title {
            Some(ref new_title) => Some(Self::validate_title(new_title)?),
            None => None,
        };

        if let Some(ref new_desc) = description {
            Self::validate_description(new_desc)?;
        }

        if let Some(new_title) = title {
            self.title = new_title;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        if let Some(new_category) = category {
            self.category = new_category;
        }
        if let Some(new_archived) = archived {
            self.archived = new_archived;
        }

        Ok(())
    }

    /// The cached streak pair as last persisted
    pub fn cached_streak(&self) -> Streak {
        Streak::new(self.current_streak, self.longest_streak)
    }

    /// Validate habit title, returning the trimmed form
    fn validate_title(title: &str) -> Result<String, DomainError> {
        let trimmed = title.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidTitle(
                "Habit title cannot be empty".to_string()
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidTitle(
                "Habit title cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(trimmed.to_string())
    }

    fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
        if let Some(desc) = description {
            if desc.chars().count() > 500 {
                return Err(DomainError::Validation {
                    message: "Description cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}
