/// Tool for updating habit metadata
///
/// This module implements the habit_update tool. Streaks are never touched
/// here; only toggles and recomputes write them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregator::{HabitAggregator, HabitUpdate, TrackerError};
use crate::domain::{Category, Habit, HabitId};
use crate::storage::HabitStorage;
use crate::tools::ToolResponse;

/// Parameters for updating a habit
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    /// ID of the habit to update
    pub habit_id: String,
    /// New title
    pub title: Option<String>,
    /// New description; an empty string clears it
    pub description: Option<String>,
    /// New category; an empty string clears it
    pub category: Option<String>,
    /// Archive (true) or restore (false) the habit
    pub archived: Option<bool>,
}

impl UpdateHabitParams {
    fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.category.is_some()
            || self.archived.is_some()
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub habit: Habit,
    pub message: String,
}

impl ToolResponse for UpdateHabitResponse {
    fn message(&self) -> &str {
        &self.message
    }
}

/// Treat an empty or blank string as "clear this field"
fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    })
}

pub fn update_habit<S: HabitStorage>(
    aggregator: &HabitAggregator<S>,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, TrackerError> {
    let habit_id = HabitId::parse(&params.habit_id)?;

    if !params.has_changes() {
        let habit = aggregator.storage().get_habit(&habit_id)?;
        return Ok(UpdateHabitResponse {
            success: true,
            message: format!("No changes requested for '{}'", habit.title),
            habit,
        });
    }

    let category = match clearable(params.category) {
        Some(Some(key)) => Some(Some(key.parse::<Category>()?)),
        Some(None) => Some(None),
        None => None,
    };

    let update = HabitUpdate {
        title: params.title,
        description: clearable(params.description),
        category,
        archived: params.archived,
    };
    let habit = aggregator.update_habit(&habit_id, update)?;

    let message = match params.archived {
        Some(true) => format!("📦 Archived '{}'", habit.title),
        Some(false) => format!("✅ Restored '{}'", habit.title),
        None => format!("✏️ Updated '{}'", habit.title),
    };

    Ok(UpdateHabitResponse {
        success: true,
        habit,
        message,
    })
}
