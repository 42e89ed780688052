//! SQLite-backed penalty and reward ledger storage.

use std::str::FromStr;

use async_trait::async_trait;
use habitquest_domain::{
    HabitId, Penalty, PenaltyDestination, PenaltyId, Reward, RewardId, UserId,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::connection::{parse_optional_timestamp, parse_timestamp, parse_uuid};
use crate::infrastructure::ports::{PenaltyRepo, RepoError, RewardRepo};

pub struct SqlitePenaltyRepo {
    pool: SqlitePool,
}

impl SqlitePenaltyRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PenaltyRepo for SqlitePenaltyRepo {
    async fn get(&self, id: PenaltyId) -> Result<Option<Penalty>, RepoError> {
        let row = sqlx::query("SELECT * FROM penalties WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("penalty_get", e))?;

        row.map(row_to_penalty).transpose()
    }

    async fn save(&self, penalty: &Penalty) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO penalties (
                id, user_id, habit_id, amount_minor, destination, reason,
                is_paid, payment_ref, created_at, paid_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                is_paid = excluded.is_paid,
                payment_ref = excluded.payment_ref,
                paid_at = excluded.paid_at
            "#,
        )
        .bind(penalty.id.to_string())
        .bind(penalty.user_id.to_string())
        .bind(penalty.habit_id.to_string())
        .bind(penalty.amount_minor)
        .bind(penalty.destination.as_str())
        .bind(&penalty.reason)
        .bind(i64::from(penalty.is_paid))
        .bind(&penalty.payment_ref)
        .bind(penalty.created_at.to_rfc3339())
        .bind(penalty.paid_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("penalty_save", e))?;

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        unpaid_only: bool,
    ) -> Result<Vec<Penalty>, RepoError> {
        let rows = if unpaid_only {
            sqlx::query(
                "SELECT * FROM penalties WHERE user_id = ? AND is_paid = 0 \
                 ORDER BY created_at DESC",
            )
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query("SELECT * FROM penalties WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await
        }
        .map_err(|e| RepoError::database("penalty_list", e))?;

        rows.into_iter().map(row_to_penalty).collect()
    }
}

pub struct SqliteRewardRepo {
    pool: SqlitePool,
}

impl SqliteRewardRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RewardRepo for SqliteRewardRepo {
    async fn get(&self, id: RewardId) -> Result<Option<Reward>, RepoError> {
        let row = sqlx::query("SELECT * FROM rewards WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("reward_get", e))?;

        row.map(row_to_reward).transpose()
    }

    async fn save(&self, reward: &Reward) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO rewards (
                id, user_id, amount_minor, reason, is_claimed, transfer_ref,
                created_at, claimed_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                is_claimed = excluded.is_claimed,
                transfer_ref = excluded.transfer_ref,
                claimed_at = excluded.claimed_at
            "#,
        )
        .bind(reward.id.to_string())
        .bind(reward.user_id.to_string())
        .bind(reward.amount_minor)
        .bind(&reward.reason)
        .bind(i64::from(reward.is_claimed))
        .bind(&reward.transfer_ref)
        .bind(reward.created_at.to_rfc3339())
        .bind(reward.claimed_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("reward_save", e))?;

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        unclaimed_only: bool,
    ) -> Result<Vec<Reward>, RepoError> {
        let rows = if unclaimed_only {
            sqlx::query(
                "SELECT * FROM rewards WHERE user_id = ? AND is_claimed = 0 \
                 ORDER BY created_at DESC",
            )
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query("SELECT * FROM rewards WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await
        }
        .map_err(|e| RepoError::database("reward_list", e))?;

        rows.into_iter().map(row_to_reward).collect()
    }
}

fn row_to_penalty(row: SqliteRow) -> Result<Penalty, RepoError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let habit_id: String = row.get("habit_id");
    let destination: String = row.get("destination");
    let created_at: String = row.get("created_at");
    let paid_at: Option<String> = row.get("paid_at");

    Ok(Penalty {
        id: PenaltyId::from_uuid(parse_uuid(&id)?),
        user_id: UserId::from_uuid(parse_uuid(&user_id)?),
        habit_id: HabitId::from_uuid(parse_uuid(&habit_id)?),
        amount_minor: row.get("amount_minor"),
        destination: PenaltyDestination::from_str(&destination)
            .map_err(|e| RepoError::serialization(e))?,
        reason: row.get("reason"),
        is_paid: row.get::<i64, _>("is_paid") != 0,
        payment_ref: row.get("payment_ref"),
        created_at: parse_timestamp(&created_at)?,
        paid_at: parse_optional_timestamp(paid_at)?,
    })
}

fn row_to_reward(row: SqliteRow) -> Result<Reward, RepoError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let created_at: String = row.get("created_at");
    let claimed_at: Option<String> = row.get("claimed_at");

    Ok(Reward {
        id: RewardId::from_uuid(parse_uuid(&id)?),
        user_id: UserId::from_uuid(parse_uuid(&user_id)?),
        amount_minor: row.get("amount_minor"),
        reason: row.get("reason"),
        is_claimed: row.get::<i64, _>("is_claimed") != 0,
        transfer_ref: row.get("transfer_ref"),
        created_at: parse_timestamp(&created_at)?,
        claimed_at: parse_optional_timestamp(claimed_at)?,
    })
}
