/// Tool for checking and repairing a habit's cached streaks
///
/// This module implements the habit_recompute tool.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::aggregator::{CacheStatus, HabitAggregator, TrackerError};
use crate::domain::{HabitId, Streak};
use crate::storage::HabitStorage;
use crate::tools::ToolResponse;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RecomputeParams {
    /// ID of the habit
    pub habit_id: String,
}

#[derive(Debug, Serialize)]
pub struct RecomputeResponse {
    pub habit_id: HabitId,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// False when the cached values had drifted and were overwritten
    pub was_consistent: bool,
    /// Cached values before the repair, if they differed
    pub previous: Option<Streak>,
    pub message: String,
}

impl ToolResponse for RecomputeResponse {
    fn message(&self) -> &str {
        &self.message
    }
}

pub fn recompute_habit<S: HabitStorage>(
    aggregator: &HabitAggregator<S>,
    params: RecomputeParams,
    today: NaiveDate,
) -> Result<RecomputeResponse, TrackerError> {
    let habit_id = HabitId::parse(&params.habit_id)?;
    let check = aggregator.verify(&habit_id, today)?;

    let (previous, message) = match check.status {
        CacheStatus::Consistent => (
            None,
            format!(
                "Streaks are up to date: current {}, longest {}",
                check.streak.current_streak, check.streak.longest_streak
            ),
        ),
        CacheStatus::InconsistentState { cached } => (
            Some(cached),
            format!(
                "⚠️ Cached streaks were stale ({}/{}); now current {}, longest {}",
                cached.current_streak,
                cached.longest_streak,
                check.streak.current_streak,
                check.streak.longest_streak
            ),
        ),
    };

    Ok(RecomputeResponse {
        habit_id,
        current_streak: check.streak.current_streak,
        longest_streak: check.streak.longest_streak,
        was_consistent: check.was_consistent(),
        previous,
        message,
    })
}
