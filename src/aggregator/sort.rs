/// Ordering of habit views
///
/// Sorting is stable and uses a single key. Order among ties is whatever
/// order the views arrived in.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::aggregator::HabitView;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Lexicographic by title
    Title,
    /// Numeric by current streak
    CurrentStreak,
    /// Chronological by creation time
    CreatedAt,
}

impl FromStr for SortKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "current_streak" => Ok(SortKey::CurrentStreak),
            "created_at" => Ok(SortKey::CreatedAt),
            _ => Err(DomainError::UnknownSortKey(format!(
                "'{}'. Valid options: title, current_streak, created_at",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(DomainError::UnknownSortKey(format!(
                "order '{}'. Valid options: asc, desc",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Parse a key and an optional order (ascending when omitted)
    pub fn parse(key: &str, order: Option<&str>) -> Result<Self, DomainError> {
        Ok(Self {
            key: key.parse::<SortKey>()?,
            order: order.map(str::parse::<SortOrder>).transpose()?.unwrap_or_default(),
        })
    }

    fn compare(&self, a: &HabitView, b: &HabitView) -> Ordering {
        let ordering = match self.key {
            SortKey::Title => a.habit.title.cmp(&b.habit.title),
            SortKey::CurrentStreak => a.habit.current_streak.cmp(&b.habit.current_streak),
            SortKey::CreatedAt => a.habit.created_at.cmp(&b.habit.created_at),
        };

        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Stable sort of views by `spec`
pub fn apply_sort(mut views: Vec<HabitView>, spec: &SortSpec) -> Vec<HabitView> {
    views.sort_by(|a, b| spec.compare(a, b));
    views
}
