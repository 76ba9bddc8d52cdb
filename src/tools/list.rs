/// Tool for listing habits with filtering and sorting
///
/// This module implements the habit_list tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregator::{FilterSpec, HabitAggregator, HabitView, SortSpec, TrackerError};
use crate::domain::DomainError;
use crate::storage::HabitStorage;
use crate::tools::{parse_window, ToolResponse};

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Only habits in this category
    pub category: Option<String>,
    /// Only archived (true) or only active (false) habits
    pub archived: Option<bool>,
    /// Only habits done today (true) or not yet done today (false)
    pub completed_today: Option<bool>,
    /// title, current_streak or created_at (default: creation order)
    pub sort_by: Option<String>,
    /// asc or desc (default: asc). Requires sort_by.
    pub order: Option<String>,
    /// Days of recent completions to include per habit (1 to 365)
    pub recent_days: Option<i64>,
}

impl ListHabitsParams {
    fn filter_spec(&self) -> Result<FilterSpec, DomainError> {
        let archived = self.archived.map(|flag| flag.to_string());
        let completed_today = self.completed_today.map(|flag| flag.to_string());

        let pairs = [
            ("category", self.category.as_deref()),
            ("archived", archived.as_deref()),
            ("completed_today", completed_today.as_deref()),
        ];
        FilterSpec::parse(
            pairs
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value))),
        )
    }

    fn sort_spec(&self) -> Result<Option<SortSpec>, DomainError> {
        match (self.sort_by.as_deref(), self.order.as_deref()) {
            (Some(key), order) => SortSpec::parse(key, order).map(Some),
            (None, Some(_)) => Err(DomainError::Validation {
                message: "'order' requires 'sort_by'".to_string(),
            }),
            (None, None) => Ok(None),
        }
    }
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitView>,
    pub total: usize,
    pub completed_today: usize,
    pub message: String,
}

impl ToolResponse for ListHabitsResponse {
    fn message(&self) -> &str {
        &self.message
    }
}

pub fn list_habits<S: HabitStorage>(
    aggregator: &HabitAggregator<S>,
    params: ListHabitsParams,
    today: NaiveDate,
) -> Result<ListHabitsResponse, TrackerError> {
    let filter = params.filter_spec()?;
    let sort = params.sort_spec()?;
    let window = parse_window(params.recent_days)?;

    let habits = aggregator.list(&filter, sort.as_ref(), today, window)?;
    let completed_today = habits
        .iter()
        .filter(|view| matches!(view.completed_on(today), Ok(true)))
        .count();

    Ok(ListHabitsResponse {
        total: habits.len(),
        completed_today,
        message: summarize(&habits, completed_today, today),
        habits,
    })
}

fn summarize(habits: &[HabitView], completed_today: usize, today: NaiveDate) -> String {
    if habits.is_empty() {
        return "No habits found. Create your first habit to get started!".to_string();
    }

    let lines = habits
        .iter()
        .map(|view| {
            let habit = &view.habit;
            let done = if matches!(view.completed_on(today), Ok(true)) { "✅" } else { "⬜" };
            let category = habit
                .category
                .as_ref()
                .map(|category| format!(" ({})", category.display_name()))
                .unwrap_or_default();
            format!(
                "{} **{}**{}\n   🔥 Streak: {} | 🏆 Best: {}{}\n   ID: {}",
                done,
                habit.title,
                category,
                habit.current_streak,
                habit.longest_streak,
                if habit.archived { " | 📦 archived" } else { "" },
                habit.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "📋 **Habits** ({}, {} done today)\n\n{}",
        habits.len(),
        completed_today,
        lines
    )
}
