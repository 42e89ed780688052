//! Habit completion workflow.
//!
//! Per (habit, calendar date) the state machine is NotCompleted ->
//! Completed, terminal once completed. The workflow checks the
//! precondition, snapshots the completion, applies the progression rules,
//! and hands everything to the storage layer as one atomic unit of work.
//! A concurrent duplicate that slips past the pre-check comes back from
//! storage as a constraint violation and is reported as AlreadyCompleted,
//! same as the pre-check path.

use std::sync::Arc;

use chrono::NaiveDate;
use habitquest_domain::{DomainError, HabitCompletion, HabitId, UserId, DEFAULT_EXP_REWARD};

use crate::infrastructure::ports::{
    ClockPort, CompletionRepo, HabitRepo, ProfileRepo, RepoError,
};
use crate::use_cases::WorkflowError;

pub struct CompleteHabit {
    habits: Arc<dyn HabitRepo>,
    completions: Arc<dyn CompletionRepo>,
    profiles: Arc<dyn ProfileRepo>,
    clock: Arc<dyn ClockPort>,
}

impl CompleteHabit {
    pub fn new(
        habits: Arc<dyn HabitRepo>,
        completions: Arc<dyn CompletionRepo>,
        profiles: Arc<dyn ProfileRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            habits,
            completions,
            profiles,
            clock,
        }
    }

    /// Record that `user_id` completed `habit_id` on `date` (today when
    /// omitted). Returns the created completion snapshot.
    pub async fn execute(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        date: Option<NaiveDate>,
    ) -> Result<HabitCompletion, WorkflowError> {
        let mut habit = self
            .habits
            .get(habit_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        if habit.user_id != user_id || !habit.is_active {
            return Err(WorkflowError::NotFound);
        }

        let now = self.clock.now();
        let date = date.unwrap_or_else(|| now.date_naive());

        if self.completions.exists(habit_id, date).await? {
            return Err(DomainError::AlreadyCompleted { habit_id, date }.into());
        }

        let mut profile = self
            .profiles
            .get(user_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;

        // Snapshot what is actually granted; never recomputed later.
        let exp_gained = if habit.exp_reward > 0 {
            habit.exp_reward
        } else {
            DEFAULT_EXP_REWARD
        };
        let completion = HabitCompletion::new(habit_id, user_id, date, exp_gained, now);

        // Habit streak: consecutive iff the previous completion was yesterday.
        let previous = self.completions.latest_date(habit_id).await?;
        let habit_continued =
            matches!((previous, date.pred_opt()), (Some(p), Some(y)) if p == y);
        habit.record_completion(habit_continued, now);

        profile.apply_progression(profile.progression().apply_completion(habit.exp_reward));

        // Profile day streak moves on the first completion of the day.
        let first_today = self
            .completions
            .list_for_user(user_id, Some(date))
            .await?
            .is_empty();
        if first_today {
            let yesterday_active = match date.pred_opt() {
                Some(yesterday) => !self
                    .completions
                    .list_for_user(user_id, Some(yesterday))
                    .await?
                    .is_empty(),
                None => false,
            };
            profile.advance_streak(yesterday_active);
        }
        profile.updated_at = now;

        self.completions
            .record(&completion, &habit, &profile)
            .await
            .map_err(|e| match e {
                RepoError::ConstraintViolation(_) => {
                    WorkflowError::Domain(DomainError::AlreadyCompleted { habit_id, date })
                }
                other => WorkflowError::Repo(other),
            })?;

        Ok(completion)
    }
}
