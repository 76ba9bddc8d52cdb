/// Tool for marking a day complete or not
///
/// This module implements the habit_toggle tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregator::{HabitAggregator, TrackerError};
use crate::domain::{parse_calendar_date, HabitId};
use crate::storage::HabitStorage;
use crate::tools::{plural, ToolResponse};

/// Parameters for toggling a habit's completion on one day
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleHabitParams {
    /// ID of the habit
    pub habit_id: String,
    /// Day to mark (YYYY-MM-DD, defaults to today, never in the future)
    pub date: Option<String>,
    /// Whether the habit was performed that day (defaults to true)
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ToggleHabitResponse {
    pub success: bool,
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub completed: bool,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub message: String,
}

impl ToolResponse for ToggleHabitResponse {
    fn message(&self) -> &str {
        &self.message
    }
}

pub fn toggle_habit<S: HabitStorage>(
    aggregator: &HabitAggregator<S>,
    params: ToggleHabitParams,
    today: NaiveDate,
) -> Result<ToggleHabitResponse, TrackerError> {
    let habit_id = HabitId::parse(&params.habit_id)?;
    let date = match params.date.as_deref() {
        Some(date) => parse_calendar_date(date)?,
        None => today,
    };
    let completed = params.completed.unwrap_or(true);

    let toggled = aggregator.toggle(&habit_id, date, completed, today)?;
    let streak = toggled.streak;

    let message = if completed {
        format!(
            "🔥 Marked {} complete! Current streak: {} day{} (best: {})",
            date,
            streak.current_streak,
            plural(streak.current_streak),
            streak.longest_streak
        )
    } else {
        format!(
            "Cleared {}. Current streak: {} day{} (best: {})",
            date,
            streak.current_streak,
            plural(streak.current_streak),
            streak.longest_streak
        )
    };

    Ok(ToggleHabitResponse {
        success: true,
        habit_id,
        date: toggled.record.date,
        completed: toggled.record.completed,
        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
        message,
    })
}
