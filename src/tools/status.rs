/// Tool for checking one habit's streaks and recent history
///
/// This module implements the habit_status tool.

use chrono::{Datelike, Duration, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregator::{HabitAggregator, HabitView, TrackerError};
use crate::domain::HabitId;
use crate::storage::HabitStorage;
use crate::tools::{parse_window, plural, ToolResponse};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitStatusParams {
    /// ID of the habit
    pub habit_id: String,
    /// Days of recent completions to include (1 to 365, default 14)
    pub recent_days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HabitStatusResponse {
    pub habit: HabitView,
    pub completed_today: bool,
    pub message: String,
}

impl ToolResponse for HabitStatusResponse {
    fn message(&self) -> &str {
        &self.message
    }
}

pub fn habit_status<S: HabitStorage>(
    aggregator: &HabitAggregator<S>,
    params: HabitStatusParams,
    today: NaiveDate,
) -> Result<HabitStatusResponse, TrackerError> {
    let habit_id = HabitId::parse(&params.habit_id)?;
    let window = parse_window(params.recent_days)?;

    let view = aggregator.view(&habit_id, today, window)?;
    let completed_today = view.completed_on(today)?;

    let habit = &view.habit;
    let today_line = if completed_today {
        "✅ Done today".to_string()
    } else if habit.current_streak > 0 {
        format!("⏳ Not done yet today; mark it to keep the {}-day streak", habit.current_streak)
    } else {
        "⬜ Not done today".to_string()
    };

    let message = format!(
        "🎯 **{}**\n🔥 Current streak: {} day{}\n🏆 Longest streak: {} day{}\n{}\n\n{}",
        habit.title,
        habit.current_streak,
        plural(habit.current_streak),
        habit.longest_streak,
        plural(habit.longest_streak),
        today_line,
        history_strip(&view)
    );

    Ok(HabitStatusResponse {
        habit: view,
        completed_today,
        message,
    })
}

/// One mark per day of the window, oldest first
fn history_strip(view: &HabitView) -> String {
    let mut marks = String::new();
    let mut day = view.window_start;
    while day <= view.window_end {
        let done = view
            .recent_completions
            .iter()
            .any(|record| record.date == day && record.completed);
        marks.push(if done { '■' } else { '□' });
        day += Duration::days(1);
    }

    format!(
        "{}/{:02} {} {}/{:02}",
        view.window_start.month(),
        view.window_start.day(),
        marks,
        view.window_end.month(),
        view.window_end.day()
    )
}
