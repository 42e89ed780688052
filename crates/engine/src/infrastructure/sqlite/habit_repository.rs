//! SQLite-backed habit storage.

use std::str::FromStr;

use async_trait::async_trait;
use habitquest_domain::{Habit, HabitCategory, HabitId, PenaltyDestination, UserId};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::connection::{parse_timestamp, parse_uuid};
use crate::infrastructure::ports::{HabitRepo, RepoError};

pub struct SqliteHabitRepo {
    pool: SqlitePool,
}

impl SqliteHabitRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HabitRepo for SqliteHabitRepo {
    async fn get(&self, id: HabitId) -> Result<Option<Habit>, RepoError> {
        let row = sqlx::query("SELECT * FROM habits WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("habit_get", e))?;

        row.map(row_to_habit).transpose()
    }

    async fn save(&self, habit: &Habit) -> Result<(), RepoError> {
        habit_upsert_query(habit)
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("habit_save", e))?;
        Ok(())
    }

    async fn list_active_for_user(&self, user_id: UserId) -> Result<Vec<Habit>, RepoError> {
        let rows = sqlx::query(
            "SELECT * FROM habits WHERE user_id = ? AND is_active = 1 ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("habit_list", e))?;

        rows.into_iter().map(row_to_habit).collect()
    }
}

pub(crate) fn row_to_habit(row: SqliteRow) -> Result<Habit, RepoError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let category: String = row.get("category");
    let destination: Option<String> = row.get("penalty_destination");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Habit {
        id: HabitId::from_uuid(parse_uuid(&id)?),
        user_id: UserId::from_uuid(parse_uuid(&user_id)?),
        name: row.get("name"),
        description: row.get("description"),
        category: HabitCategory::from_str(&category)
            .map_err(|e| RepoError::serialization(e))?,
        icon: row.get("icon"),
        exp_reward: row.get("exp_reward"),
        penalty_minor: row.get("penalty_minor"),
        penalty_destination: destination
            .as_deref()
            .map(PenaltyDestination::from_str)
            .transpose()
            .map_err(|e| RepoError::serialization(e))?,
        is_active: row.get::<i64, _>("is_active") != 0,
        current_streak: row.get::<i64, _>("current_streak") as u32,
        longest_streak: row.get::<i64, _>("longest_streak") as u32,
        total_completions: row.get::<i64, _>("total_completions") as u32,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Upsert query for a habit row; shared with the completion unit of work.
pub(crate) fn habit_upsert_query(
    habit: &Habit,
) -> sqlx::query::Query<'_, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
    sqlx::query(
        r#"
        INSERT INTO habits (
            id, user_id, name, description, category, icon, exp_reward,
            penalty_minor, penalty_destination, is_active, current_streak,
            longest_streak, total_completions, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            category = excluded.category,
            icon = excluded.icon,
            exp_reward = excluded.exp_reward,
            penalty_minor = excluded.penalty_minor,
            penalty_destination = excluded.penalty_destination,
            is_active = excluded.is_active,
            current_streak = excluded.current_streak,
            longest_streak = excluded.longest_streak,
            total_completions = excluded.total_completions,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(habit.id.to_string())
    .bind(habit.user_id.to_string())
    .bind(&habit.name)
    .bind(&habit.description)
    .bind(habit.category.as_str())
    .bind(&habit.icon)
    .bind(habit.exp_reward)
    .bind(habit.penalty_minor)
    .bind(habit.penalty_destination.map(|d| d.as_str()))
    .bind(i64::from(habit.is_active))
    .bind(i64::from(habit.current_streak))
    .bind(i64::from(habit.longest_streak))
    .bind(i64::from(habit.total_completions))
    .bind(habit.created_at.to_rfc3339())
    .bind(habit.updated_at.to_rfc3339())
}
