//! HabitQuest domain layer.
//!
//! Entities, typed ids, progression arithmetic, and unlock rules. This
//! crate is pure: no I/O, no async, no storage types. Persistence and
//! orchestration live in `habitquest-engine`.

pub mod catalog;
pub mod entities;
pub mod error;
pub mod ids;
pub mod progression;
pub mod unlocks;

pub use entities::{
    Achievement, AchievementCategory, CategoryStats, Habit, HabitCategory, HabitCompletion,
    Penalty, PenaltyDestination, Rarity, Reward, Skill, SkillCategory, UserAchievement,
    UserProfile, UserSkill, DEFAULT_ACHIEVEMENT_ICON, DEFAULT_CHARACTER_CLASS,
    DEFAULT_HABIT_EXP_REWARD, DEFAULT_HABIT_ICON, DEFAULT_PENALTY_MINOR, DEFAULT_SKILL_ICON,
    DEFAULT_TITLE,
};
pub use error::DomainError;
pub use ids::{
    AchievementId, CompletionId, HabitId, PenaltyId, RewardId, SkillId, UserAchievementId,
    UserId, UserSkillId,
};
pub use progression::{ProgressionState, COMPLETION_CURRENCY, DEFAULT_EXP_REWARD};
pub use unlocks::{
    achievement_progress, eligible_achievements, validate_skill_unlock, UnlockStats,
};
