//! SQLite-backed user profile storage.

use async_trait::async_trait;
use habitquest_domain::{CategoryStats, UserId, UserProfile};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::connection::{parse_timestamp, parse_uuid};
use crate::infrastructure::ports::{ProfileRepo, RepoError};

pub struct SqliteProfileRepo {
    pool: SqlitePool,
}

impl SqliteProfileRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepo for SqliteProfileRepo {
    async fn get(&self, id: UserId) -> Result<Option<UserProfile>, RepoError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("profile_get", e))?;

        row.map(row_to_profile).transpose()
    }

    async fn save(&self, profile: &UserProfile) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, display_name, level, experience, experience_to_next,
                currency, character_class, title, current_streak, longest_streak,
                total_achievements, strength_stat, intelligence_stat,
                discipline_stat, social_stat, gateway_customer_id,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                display_name = excluded.display_name,
                level = excluded.level,
                experience = excluded.experience,
                experience_to_next = excluded.experience_to_next,
                currency = excluded.currency,
                character_class = excluded.character_class,
                title = excluded.title,
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                total_achievements = excluded.total_achievements,
                strength_stat = excluded.strength_stat,
                intelligence_stat = excluded.intelligence_stat,
                discipline_stat = excluded.discipline_stat,
                social_stat = excluded.social_stat,
                gateway_customer_id = excluded.gateway_customer_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(profile.id.to_string())
        .bind(&profile.email)
        .bind(&profile.display_name)
        .bind(i64::from(profile.level))
        .bind(profile.experience)
        .bind(profile.experience_to_next)
        .bind(profile.currency)
        .bind(&profile.character_class)
        .bind(&profile.title)
        .bind(i64::from(profile.current_streak))
        .bind(i64::from(profile.longest_streak))
        .bind(i64::from(profile.total_achievements))
        .bind(i64::from(profile.stats.strength))
        .bind(i64::from(profile.stats.intelligence))
        .bind(i64::from(profile.stats.discipline))
        .bind(i64::from(profile.stats.social))
        .bind(&profile.gateway_customer_id)
        .bind(profile.created_at.to_rfc3339())
        .bind(profile.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("profile_save", e))?;

        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("profile_delete", e))?;
        Ok(())
    }
}

fn row_to_profile(row: SqliteRow) -> Result<UserProfile, RepoError> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(UserProfile {
        id: UserId::from_uuid(parse_uuid(&id)?),
        email: row.get("email"),
        display_name: row.get("display_name"),
        level: row.get::<i64, _>("level") as u32,
        experience: row.get("experience"),
        experience_to_next: row.get("experience_to_next"),
        currency: row.get("currency"),
        character_class: row.get("character_class"),
        title: row.get("title"),
        current_streak: row.get::<i64, _>("current_streak") as u32,
        longest_streak: row.get::<i64, _>("longest_streak") as u32,
        total_achievements: row.get::<i64, _>("total_achievements") as u32,
        stats: CategoryStats {
            strength: row.get::<i64, _>("strength_stat") as u32,
            intelligence: row.get::<i64, _>("intelligence_stat") as u32,
            discipline: row.get::<i64, _>("discipline_stat") as u32,
            social: row.get::<i64, _>("social_stat") as u32,
        },
        gateway_customer_id: row.get("gateway_customer_id"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Bind the profile's mutable progression columns onto an UPDATE inside a
/// transaction. Shared by the workflows that persist profile changes
/// atomically with another write.
pub(crate) fn profile_update_query(profile: &UserProfile) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(
        r#"
        UPDATE users SET
            level = ?,
            experience = ?,
            experience_to_next = ?,
            currency = ?,
            current_streak = ?,
            longest_streak = ?,
            total_achievements = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(i64::from(profile.level))
    .bind(profile.experience)
    .bind(profile.experience_to_next)
    .bind(profile.currency)
    .bind(i64::from(profile.current_streak))
    .bind(i64::from(profile.longest_streak))
    .bind(i64::from(profile.total_achievements))
    .bind(profile.updated_at.to_rfc3339())
    .bind(profile.id.to_string())
}
