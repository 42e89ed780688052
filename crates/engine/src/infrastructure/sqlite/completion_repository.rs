//! SQLite-backed completion storage, including the completion unit of work.

use async_trait::async_trait;
use chrono::NaiveDate;
use habitquest_domain::{CompletionId, Habit, HabitCompletion, HabitId, UserId, UserProfile};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::connection::{map_write_err, parse_date, parse_timestamp, parse_uuid};
use super::habit_repository::habit_upsert_query;
use super::profile_repository::profile_update_query;
use crate::infrastructure::ports::{CompletionRepo, DailyCount, RepoError};

pub struct SqliteCompletionRepo {
    pool: SqlitePool,
}

impl SqliteCompletionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompletionRepo for SqliteCompletionRepo {
    async fn list_for_user(
        &self,
        user_id: UserId,
        date: Option<NaiveDate>,
    ) -> Result<Vec<HabitCompletion>, RepoError> {
        let rows = match date {
            Some(date) => {
                sqlx::query(
                    "SELECT * FROM habit_completions WHERE user_id = ? AND date = ? \
                     ORDER BY completed_at DESC",
                )
                .bind(user_id.to_string())
                .bind(date.to_string())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT * FROM habit_completions WHERE user_id = ? \
                     ORDER BY completed_at DESC",
                )
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| RepoError::database("completion_list", e))?;

        rows.into_iter().map(row_to_completion).collect()
    }

    async fn exists(&self, habit_id: HabitId, date: NaiveDate) -> Result<bool, RepoError> {
        let row = sqlx::query(
            "SELECT 1 FROM habit_completions WHERE habit_id = ? AND date = ? LIMIT 1",
        )
        .bind(habit_id.to_string())
        .bind(date.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("completion_exists", e))?;

        Ok(row.is_some())
    }

    async fn latest_date(&self, habit_id: HabitId) -> Result<Option<NaiveDate>, RepoError> {
        let row = sqlx::query(
            "SELECT date FROM habit_completions WHERE habit_id = ? ORDER BY date DESC LIMIT 1",
        )
        .bind(habit_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("completion_latest", e))?;

        match row {
            Some(row) => {
                let date: String = row.get("date");
                Ok(Some(parse_date(&date)?))
            }
            None => Ok(None),
        }
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<u32, RepoError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM habit_completions WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("completion_count", e))?;

        Ok(row.get::<i64, _>("count") as u32)
    }

    async fn daily_counts_since(
        &self,
        user_id: UserId,
        from: NaiveDate,
    ) -> Result<Vec<DailyCount>, RepoError> {
        let rows = sqlx::query(
            "SELECT date, COUNT(*) AS completed FROM habit_completions \
             WHERE user_id = ? AND date >= ? \
             GROUP BY date ORDER BY date",
        )
        .bind(user_id.to_string())
        .bind(from.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("completion_daily_counts", e))?;

        rows.into_iter()
            .map(|row| {
                let date: String = row.get("date");
                Ok(DailyCount {
                    date: parse_date(&date)?,
                    completed: row.get::<i64, _>("completed") as u32,
                })
            })
            .collect()
    }

    async fn record(
        &self,
        completion: &HabitCompletion,
        habit: &Habit,
        profile: &UserProfile,
    ) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("completion_record", e))?;

        // The UNIQUE (habit_id, date) constraint fires here if a concurrent
        // request already recorded this date.
        sqlx::query(
            r#"
            INSERT INTO habit_completions (id, habit_id, user_id, date, exp_gained, completed_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(completion.id.to_string())
        .bind(completion.habit_id.to_string())
        .bind(completion.user_id.to_string())
        .bind(completion.date.to_string())
        .bind(completion.exp_gained)
        .bind(completion.completed_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_err("completion_record", e))?;

        habit_upsert_query(habit)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("completion_record", e))?;

        profile_update_query(profile)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("completion_record", e))?;

        tx.commit()
            .await
            .map_err(|e| RepoError::database("completion_record", e))
    }
}

fn row_to_completion(row: SqliteRow) -> Result<HabitCompletion, RepoError> {
    let id: String = row.get("id");
    let habit_id: String = row.get("habit_id");
    let user_id: String = row.get("user_id");
    let date: String = row.get("date");
    let completed_at: String = row.get("completed_at");

    Ok(HabitCompletion {
        id: CompletionId::from_uuid(parse_uuid(&id)?),
        habit_id: HabitId::from_uuid(parse_uuid(&habit_id)?),
        user_id: UserId::from_uuid(parse_uuid(&user_id)?),
        date: parse_date(&date)?,
        exp_gained: row.get("exp_gained"),
        completed_at: parse_timestamp(&completed_at)?,
    })
}
