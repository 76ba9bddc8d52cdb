/// Core types used throughout the domain layer
///
/// This module defines the identifier and Category types shared by Habit,
/// CompletionRecord and the storage layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around UUID to provide type safety - you can't accidentally
/// pass an arbitrary string where a habit ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }

    /// Parse a caller-supplied ID, reporting failures as invalid input
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        Self::from_string(s).map_err(|_| DomainError::Validation {
            message: format!("'{}' is not a valid habit ID", s),
        })
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Categories for organizing habits into different life areas
///
/// Users can also define custom categories beyond the predefined ones.
/// The storage form is the lowercase key, with custom categories written
/// as `custom:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Health-related habits (exercise, diet, sleep)
    Health,
    /// Work and learning habits (studying, skill building)
    Productivity,
    /// Relationship and communication habits
    Social,
    /// Creative pursuits (art, writing, music)
    Creative,
    /// Meditation, reflection, gratitude practices
    Mindfulness,
    /// Money management and financial habits
    Financial,
    /// Home maintenance and organization
    Household,
    /// Personal growth and self-care
    Personal,
    /// User-defined category with custom name
    Custom(String),
}

impl Category {
    /// Get the display name for this category
    pub fn display_name(&self) -> &str {
        match self {
            Category::Health => "Health",
            Category::Productivity => "Productivity",
            Category::Social => "Social",
            Category::Creative => "Creative",
            Category::Mindfulness => "Mindfulness",
            Category::Financial => "Financial",
            Category::Household => "Household",
            Category::Personal => "Personal",
            Category::Custom(name) => name,
        }
    }

    /// Key used on the wire and in the database
    pub fn key(&self) -> String {
        match self {
            Category::Health => "health".to_string(),
            Category::Productivity => "productivity".to_string(),
            Category::Social => "social".to_string(),
            Category::Creative => "creative".to_string(),
            Category::Mindfulness => "mindfulness".to_string(),
            Category::Financial => "financial".to_string(),
            Category::Household => "household".to_string(),
            Category::Personal => "personal".to_string(),
            Category::Custom(name) => format!("custom:{}", name),
        }
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Custom names keep their case, the prefix does not
        if trimmed.get(..7).is_some_and(|prefix| prefix.eq_ignore_ascii_case("custom:")) {
            let name = trimmed[7..].trim();
            if name.is_empty() {
                return Err(DomainError::InvalidCategory(
                    "Custom category name cannot be empty".to_string()
                ));
            }
            return Ok(Category::Custom(name.to_string()));
        }

        match trimmed.to_lowercase().as_str() {
            "health" => Ok(Category::Health),
            "productivity" => Ok(Category::Productivity),
            "social" => Ok(Category::Social),
            "creative" => Ok(Category::Creative),
            "mindfulness" => Ok(Category::Mindfulness),
            "financial" => Ok(Category::Financial),
            "household" => Ok(Category::Household),
            "personal" => Ok(Category::Personal),
            _ => Err(DomainError::InvalidCategory(format!(
                "'{}'. Valid options: health, productivity, social, creative, mindfulness, financial, household, personal, or custom:name",
                s
            ))),
        }
    }
}
