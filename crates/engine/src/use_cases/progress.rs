//! Profile operations and progress read paths.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use habitquest_domain::{HabitCompletion, UserId, UserProfile};

use crate::infrastructure::ports::{ClockPort, CompletionRepo, DailyCount, ProfileRepo};
use crate::use_cases::validation::require_non_empty_if_present;
use crate::use_cases::WorkflowError;

/// Days covered by the weekly progress view, today included.
const WEEKLY_WINDOW_DAYS: i64 = 7;

pub struct ProfileOps {
    profiles: Arc<dyn ProfileRepo>,
    completions: Arc<dyn CompletionRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ProfileOps {
    pub fn new(
        profiles: Arc<dyn ProfileRepo>,
        completions: Arc<dyn CompletionRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            profiles,
            completions,
            clock,
        }
    }

    /// Create a fresh level-1 profile. Identity normally arrives from the
    /// auth layer; this is the explicit entry point standing in for it.
    pub async fn create(
        &self,
        email: Option<String>,
        display_name: Option<String>,
    ) -> Result<UserProfile, WorkflowError> {
        require_non_empty_if_present(&email, "Email")?;
        require_non_empty_if_present(&display_name, "Display name")?;

        let mut profile = UserProfile::new(UserId::new(), self.clock.now());
        profile.email = email;
        profile.display_name = display_name;

        self.profiles.save(&profile).await?;
        Ok(profile)
    }

    pub async fn get(&self, user_id: UserId) -> Result<UserProfile, WorkflowError> {
        self.profiles
            .get(user_id)
            .await?
            .ok_or(WorkflowError::NotFound)
    }

    pub async fn completions(
        &self,
        user_id: UserId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<HabitCompletion>, WorkflowError> {
        Ok(self.completions.list_for_user(user_id, date).await?)
    }

    /// Per-day completion counts over the trailing week. Days with no
    /// completions are absent from the result.
    pub async fn weekly_progress(&self, user_id: UserId) -> Result<Vec<DailyCount>, WorkflowError> {
        let today = self.clock.now().date_naive();
        let from = today - Duration::days(WEEKLY_WINDOW_DAYS - 1);
        Ok(self.completions.daily_counts_since(user_id, from).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockClockPort, MockCompletionRepo, MockProfileRepo};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::*;

    #[tokio::test]
    async fn weekly_progress_queries_trailing_seven_days() {
        let user_id = UserId::new();
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap());

        let from = NaiveDate::from_ymd_opt(2025, 6, 9).expect("valid date");
        let mut completions = MockCompletionRepo::new();
        completions
            .expect_daily_counts_since()
            .with(eq(user_id), eq(from))
            .returning(|_, _| {
                Ok(vec![DailyCount {
                    date: NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date"),
                    completed: 2,
                }])
            });

        let queries = ProfileOps::new(
            Arc::new(MockProfileRepo::new()),
            Arc::new(completions),
            Arc::new(clock),
        );

        let progress = queries.weekly_progress(user_id).await.expect("progress");
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].completed, 2);
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let mut profiles = MockProfileRepo::new();
        profiles.expect_get().returning(|_| Ok(None));

        let queries = ProfileOps::new(
            Arc::new(profiles),
            Arc::new(MockCompletionRepo::new()),
            Arc::new(MockClockPort::new()),
        );

        let result = queries.get(UserId::new()).await;
        assert!(matches!(result, Err(WorkflowError::NotFound)));
    }
}
