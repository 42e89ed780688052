//! SQLite-backed skill catalog and unlock storage.

use std::str::FromStr;

use async_trait::async_trait;
use habitquest_domain::{
    Skill, SkillCategory, SkillId, UserId, UserProfile, UserSkill, UserSkillId,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::connection::{map_write_err, parse_timestamp, parse_uuid};
use super::profile_repository::profile_update_query;
use crate::infrastructure::ports::{RepoError, SkillRepo};

pub struct SqliteSkillRepo {
    pool: SqlitePool,
}

impl SqliteSkillRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SkillRepo for SqliteSkillRepo {
    async fn list_catalog(&self) -> Result<Vec<Skill>, RepoError> {
        let rows = sqlx::query("SELECT * FROM skills ORDER BY tier, required_level")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("skill_list", e))?;

        rows.into_iter().map(row_to_skill).collect()
    }

    async fn get_catalog_entry(&self, id: SkillId) -> Result<Option<Skill>, RepoError> {
        let row = sqlx::query("SELECT * FROM skills WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("skill_get", e))?;

        row.map(row_to_skill).transpose()
    }

    async fn seed_catalog(&self, entries: &[Skill]) -> Result<(), RepoError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM skills")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("skill_seed", e))?
            .get("count");

        if count > 0 {
            return Ok(());
        }

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO skills (
                    id, name, description, icon, category, tier, cost,
                    required_level, effect
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.id.to_string())
            .bind(&entry.name)
            .bind(&entry.description)
            .bind(&entry.icon)
            .bind(entry.category.as_str())
            .bind(i64::from(entry.tier))
            .bind(entry.cost)
            .bind(i64::from(entry.required_level))
            .bind(&entry.effect)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("skill_seed", e))?;
        }

        tracing::info!(count = entries.len(), "Seeded skill catalog");
        Ok(())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<UserSkill>, RepoError> {
        let rows =
            sqlx::query("SELECT * FROM user_skills WHERE user_id = ? ORDER BY unlocked_at DESC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::database("skill_list_user", e))?;

        rows.into_iter().map(row_to_user_skill).collect()
    }

    async fn is_unlocked(&self, user_id: UserId, skill_id: SkillId) -> Result<bool, RepoError> {
        let row = sqlx::query(
            "SELECT 1 FROM user_skills WHERE user_id = ? AND skill_id = ? LIMIT 1",
        )
        .bind(user_id.to_string())
        .bind(skill_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("skill_is_unlocked", e))?;

        Ok(row.is_some())
    }

    async fn record_unlock(
        &self,
        unlock: &UserSkill,
        profile: &UserProfile,
    ) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("skill_unlock", e))?;

        // UNIQUE (user_id, skill_id) backstops concurrent unlock requests.
        sqlx::query(
            r#"
            INSERT INTO user_skills (id, user_id, skill_id, is_active, unlocked_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(unlock.id.to_string())
        .bind(unlock.user_id.to_string())
        .bind(unlock.skill_id.to_string())
        .bind(i64::from(unlock.is_active))
        .bind(unlock.unlocked_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_err("skill_unlock", e))?;

        profile_update_query(profile)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("skill_unlock", e))?;

        tx.commit()
            .await
            .map_err(|e| RepoError::database("skill_unlock", e))
    }
}

fn row_to_skill(row: SqliteRow) -> Result<Skill, RepoError> {
    let id: String = row.get("id");
    let category: String = row.get("category");

    Ok(Skill {
        id: SkillId::from_uuid(parse_uuid(&id)?),
        name: row.get("name"),
        description: row.get("description"),
        icon: row.get("icon"),
        category: SkillCategory::from_str(&category).map_err(|e| RepoError::serialization(e))?,
        tier: row.get::<i64, _>("tier") as u32,
        cost: row.get("cost"),
        required_level: row.get::<i64, _>("required_level") as u32,
        effect: row.get("effect"),
    })
}

fn row_to_user_skill(row: SqliteRow) -> Result<UserSkill, RepoError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let skill_id: String = row.get("skill_id");
    let unlocked_at: String = row.get("unlocked_at");

    Ok(UserSkill {
        id: UserSkillId::from_uuid(parse_uuid(&id)?),
        user_id: UserId::from_uuid(parse_uuid(&user_id)?),
        skill_id: SkillId::from_uuid(parse_uuid(&skill_id)?),
        is_active: row.get::<i64, _>("is_active") != 0,
        unlocked_at: parse_timestamp(&unlocked_at)?,
    })
}
