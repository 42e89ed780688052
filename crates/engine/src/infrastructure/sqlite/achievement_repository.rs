//! SQLite-backed achievement catalog and unlock storage.

use std::str::FromStr;

use async_trait::async_trait;
use habitquest_domain::{
    Achievement, AchievementCategory, AchievementId, Rarity, UserAchievement, UserAchievementId,
    UserId, UserProfile,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::connection::{map_write_err, parse_timestamp, parse_uuid};
use super::profile_repository::profile_update_query;
use crate::infrastructure::ports::{AchievementRepo, RepoError};

pub struct SqliteAchievementRepo {
    pool: SqlitePool,
}

impl SqliteAchievementRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AchievementRepo for SqliteAchievementRepo {
    async fn list_catalog(&self) -> Result<Vec<Achievement>, RepoError> {
        let rows = sqlx::query("SELECT * FROM achievements ORDER BY category, requirement")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("achievement_list", e))?;

        rows.into_iter().map(row_to_achievement).collect()
    }

    async fn seed_catalog(&self, entries: &[Achievement]) -> Result<(), RepoError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM achievements")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("achievement_seed", e))?
            .get("count");

        if count > 0 {
            return Ok(());
        }

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO achievements (
                    id, name, description, icon, category, requirement,
                    exp_reward, currency_reward, rarity, is_secret
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.id.to_string())
            .bind(&entry.name)
            .bind(&entry.description)
            .bind(&entry.icon)
            .bind(entry.category.as_str())
            .bind(i64::from(entry.requirement))
            .bind(entry.exp_reward)
            .bind(entry.currency_reward)
            .bind(entry.rarity.as_str())
            .bind(i64::from(entry.is_secret))
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("achievement_seed", e))?;
        }

        tracing::info!(count = entries.len(), "Seeded achievement catalog");
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<UserAchievement>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM user_achievements WHERE user_id = ? ORDER BY unlocked_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("achievement_list_user", e))?;

        rows.into_iter().map(row_to_user_achievement).collect()
    }

    async fn record_unlock(
        &self,
        unlock: &UserAchievement,
        profile: &UserProfile,
    ) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("achievement_unlock", e))?;

        // UNIQUE (user_id, achievement_id) backstops concurrent evaluations.
        sqlx::query(
            r#"
            INSERT INTO user_achievements (id, user_id, achievement_id, progress, unlocked_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(unlock.id.to_string())
        .bind(unlock.user_id.to_string())
        .bind(unlock.achievement_id.to_string())
        .bind(i64::from(unlock.progress))
        .bind(unlock.unlocked_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_err("achievement_unlock", e))?;

        profile_update_query(profile)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("achievement_unlock", e))?;

        tx.commit()
            .await
            .map_err(|e| RepoError::database("achievement_unlock", e))
    }
}

fn row_to_achievement(row: SqliteRow) -> Result<Achievement, RepoError> {
    let id: String = row.get("id");
    let category: String = row.get("category");
    let rarity: String = row.get("rarity");

    Ok(Achievement {
        id: AchievementId::from_uuid(parse_uuid(&id)?),
        name: row.get("name"),
        description: row.get("description"),
        icon: row.get("icon"),
        category: AchievementCategory::from_str(&category)
            .map_err(|e| RepoError::serialization(e))?,
        requirement: row.get::<i64, _>("requirement") as u32,
        exp_reward: row.get("exp_reward"),
        currency_reward: row.get("currency_reward"),
        rarity: Rarity::from_str(&rarity).map_err(|e| RepoError::serialization(e))?,
        is_secret: row.get::<i64, _>("is_secret") != 0,
    })
}

fn row_to_user_achievement(row: SqliteRow) -> Result<UserAchievement, RepoError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let achievement_id: String = row.get("achievement_id");
    let unlocked_at: String = row.get("unlocked_at");

    Ok(UserAchievement {
        id: UserAchievementId::from_uuid(parse_uuid(&id)?),
        user_id: UserId::from_uuid(parse_uuid(&user_id)?),
        achievement_id: AchievementId::from_uuid(parse_uuid(&achievement_id)?),
        progress: row.get::<i64, _>("progress") as u32,
        unlocked_at: parse_timestamp(&unlocked_at)?,
    })
}
