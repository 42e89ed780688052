//! Repository port traits for database access.

use async_trait::async_trait;
use chrono::NaiveDate;
use habitquest_domain::{
    Achievement, Habit, HabitCompletion, HabitId, Penalty, PenaltyId, Reward, RewardId, Skill,
    SkillId, UserAchievement, UserId, UserProfile, UserSkill,
};

use super::error::RepoError;

/// Completions per calendar day, for progress charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub completed: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<UserProfile>, RepoError>;
    /// Insert or update the full profile row.
    async fn save(&self, profile: &UserProfile) -> Result<(), RepoError>;
    /// Delete the profile; per-user rows cascade with it.
    async fn delete(&self, id: UserId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HabitRepo: Send + Sync {
    async fn get(&self, id: HabitId) -> Result<Option<Habit>, RepoError>;
    async fn save(&self, habit: &Habit) -> Result<(), RepoError>;
    /// Active habits only, newest first. Soft-deleted habits are excluded.
    async fn list_active_for_user(&self, user_id: UserId) -> Result<Vec<Habit>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionRepo: Send + Sync {
    /// Completions for a user, optionally restricted to one date, newest first.
    async fn list_for_user(
        &self,
        user_id: UserId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<HabitCompletion>, RepoError>;
    async fn exists(&self, habit_id: HabitId, date: NaiveDate) -> Result<bool, RepoError>;
    /// Date of the habit's most recent completion.
    async fn latest_date(&self, habit_id: HabitId) -> Result<Option<NaiveDate>, RepoError>;
    async fn count_for_user(&self, user_id: UserId) -> Result<u32, RepoError>;
    /// Per-day completion counts from `from` onward, ascending by date.
    async fn daily_counts_since(
        &self,
        user_id: UserId,
        from: NaiveDate,
    ) -> Result<Vec<DailyCount>, RepoError>;
    /// Atomic unit of work for the completion workflow: persist the
    /// completion record, the habit's updated counters, and the updated
    /// profile together - all visible or none. A duplicate (habit, date)
    /// surfaces as `RepoError::ConstraintViolation`.
    async fn record(
        &self,
        completion: &HabitCompletion,
        habit: &Habit,
        profile: &UserProfile,
    ) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementRepo: Send + Sync {
    /// The full catalog, ordered by category then requirement.
    async fn list_catalog(&self) -> Result<Vec<Achievement>, RepoError>;
    /// Insert the catalog if the table is empty; otherwise leave it alone.
    async fn seed_catalog(&self, entries: &[Achievement]) -> Result<(), RepoError>;
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<UserAchievement>, RepoError>;
    /// Persist the unlock record and the profile's granted rewards in one
    /// transaction. A duplicate (user, achievement) surfaces as
    /// `RepoError::ConstraintViolation`.
    async fn record_unlock(
        &self,
        unlock: &UserAchievement,
        profile: &UserProfile,
    ) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillRepo: Send + Sync {
    /// The full skill tree, ordered by tier then required level.
    async fn list_catalog(&self) -> Result<Vec<Skill>, RepoError>;
    async fn get_catalog_entry(&self, id: SkillId) -> Result<Option<Skill>, RepoError>;
    /// Insert the catalog if the table is empty; otherwise leave it alone.
    async fn seed_catalog(&self, entries: &[Skill]) -> Result<(), RepoError>;
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<UserSkill>, RepoError>;
    async fn is_unlocked(&self, user_id: UserId, skill_id: SkillId) -> Result<bool, RepoError>;
    /// Persist the unlock record and the profile's cost deduction in one
    /// transaction. A duplicate (user, skill) surfaces as
    /// `RepoError::ConstraintViolation`.
    async fn record_unlock(
        &self,
        unlock: &UserSkill,
        profile: &UserProfile,
    ) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PenaltyRepo: Send + Sync {
    async fn get(&self, id: PenaltyId) -> Result<Option<Penalty>, RepoError>;
    async fn save(&self, penalty: &Penalty) -> Result<(), RepoError>;
    /// Penalties for a user, newest first; optionally unpaid only.
    async fn list_for_user(
        &self,
        user_id: UserId,
        unpaid_only: bool,
    ) -> Result<Vec<Penalty>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RewardRepo: Send + Sync {
    async fn get(&self, id: RewardId) -> Result<Option<Reward>, RepoError>;
    async fn save(&self, reward: &Reward) -> Result<(), RepoError>;
    /// Rewards for a user, newest first; optionally unclaimed only.
    async fn list_for_user(
        &self,
        user_id: UserId,
        unclaimed_only: bool,
    ) -> Result<Vec<Reward>, RepoError>;
}
