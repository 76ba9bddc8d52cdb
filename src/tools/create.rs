/// Tool for creating new habits
///
/// This module implements the habit_create tool.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregator::{HabitAggregator, TrackerError};
use crate::domain::{Category, Habit};
use crate::storage::HabitStorage;
use crate::tools::ToolResponse;

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Title of the habit (1 to 100 characters)
    pub title: String,
    /// Optional longer description (up to 500 characters)
    pub description: Option<String>,
    /// health, productivity, social, creative, mindfulness, financial,
    /// household, personal, or custom:name
    pub category: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit: Habit,
    pub message: String,
}

impl ToolResponse for CreateHabitResponse {
    fn message(&self) -> &str {
        &self.message
    }
}

pub fn create_habit<S: HabitStorage>(
    aggregator: &HabitAggregator<S>,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, TrackerError> {
    let category = params
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()?;

    let habit = aggregator.create_habit(params.title, params.description, category)?;

    Ok(CreateHabitResponse {
        success: true,
        message: format!(
            "✅ Created habit '{}'! Ready to start your streak!\nHabit ID: {}",
            habit.title, habit.id
        ),
        habit,
    })
}
