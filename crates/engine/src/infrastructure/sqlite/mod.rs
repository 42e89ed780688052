//! SQLite implementations of the repository ports.

mod achievement_repository;
mod completion_repository;
mod connection;
mod habit_repository;
mod ledger_repository;
mod profile_repository;
mod skill_repository;

pub use achievement_repository::SqliteAchievementRepo;
pub use completion_repository::SqliteCompletionRepo;
pub use connection::{connect, ensure_schema};
pub use habit_repository::SqliteHabitRepo;
pub use ledger_repository::{SqlitePenaltyRepo, SqliteRewardRepo};
pub use profile_repository::SqliteProfileRepo;
pub use skill_repository::SqliteSkillRepo;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::app::Repositories;

/// Build the full repository container over one pool.
pub fn repositories(pool: SqlitePool) -> Repositories {
    Repositories {
        profile: Arc::new(SqliteProfileRepo::new(pool.clone())),
        habit: Arc::new(SqliteHabitRepo::new(pool.clone())),
        completion: Arc::new(SqliteCompletionRepo::new(pool.clone())),
        achievement: Arc::new(SqliteAchievementRepo::new(pool.clone())),
        skill: Arc::new(SqliteSkillRepo::new(pool.clone())),
        penalty: Arc::new(SqlitePenaltyRepo::new(pool.clone())),
        reward: Arc::new(SqliteRewardRepo::new(pool)),
    }
}
