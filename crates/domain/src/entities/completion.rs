//! HabitCompletion entity - the immutable fact that a habit was done on a date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CompletionId, HabitId, UserId};

/// One habit completed on one calendar date.
///
/// At most one completion may exist per (habit, date); the storage layer
/// enforces this with a uniqueness constraint. The experience granted is a
/// snapshot of the habit's reward at completion time and is never
/// recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCompletion {
    pub id: CompletionId,
    pub habit_id: HabitId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub exp_gained: i64,
    pub completed_at: DateTime<Utc>,
}

impl HabitCompletion {
    pub fn new(
        habit_id: HabitId,
        user_id: UserId,
        date: NaiveDate,
        exp_gained: i64,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CompletionId::new(),
            habit_id,
            user_id,
            date,
            exp_gained,
            completed_at,
        }
    }
}
