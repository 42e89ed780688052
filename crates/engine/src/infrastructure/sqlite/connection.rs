//! SQLite pool setup and schema management.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use uuid::Uuid;

use crate::infrastructure::ports::RepoError;

/// Open (creating if missing) the database at `db_path`.
///
/// Foreign keys are switched on so per-user rows cascade with their
/// owning profile.
pub async fn connect(db_path: &str) -> Result<SqlitePool, RepoError> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))
        .map_err(|e| RepoError::database("connect", e))?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePool::connect_with(options)
        .await
        .map_err(|e| RepoError::database("connect", e))
}

/// Ensure all tables and constraints exist.
///
/// The UNIQUE constraints here are load-bearing: (habit_id, date) turns the
/// duplicate-completion race into a constraint violation the workflow maps
/// to AlreadyCompleted, and the unlock tables guarantee at most one record
/// per (user, catalog entry) pair.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT,
            display_name TEXT,
            level INTEGER NOT NULL,
            experience INTEGER NOT NULL,
            experience_to_next INTEGER NOT NULL,
            currency INTEGER NOT NULL,
            character_class TEXT NOT NULL,
            title TEXT NOT NULL,
            current_streak INTEGER NOT NULL,
            longest_streak INTEGER NOT NULL,
            total_achievements INTEGER NOT NULL,
            strength_stat INTEGER NOT NULL,
            intelligence_stat INTEGER NOT NULL,
            discipline_stat INTEGER NOT NULL,
            social_stat INTEGER NOT NULL,
            gateway_customer_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            category TEXT NOT NULL,
            icon TEXT NOT NULL,
            exp_reward INTEGER NOT NULL,
            penalty_minor INTEGER NOT NULL,
            penalty_destination TEXT,
            is_active INTEGER NOT NULL,
            current_streak INTEGER NOT NULL,
            longest_streak INTEGER NOT NULL,
            total_completions INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS habit_completions (
            id TEXT PRIMARY KEY,
            habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            exp_gained INTEGER NOT NULL,
            completed_at TEXT NOT NULL,
            UNIQUE (habit_id, date)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS achievements (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            icon TEXT NOT NULL,
            category TEXT NOT NULL,
            requirement INTEGER NOT NULL,
            exp_reward INTEGER NOT NULL,
            currency_reward INTEGER NOT NULL,
            rarity TEXT NOT NULL,
            is_secret INTEGER NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS user_achievements (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            achievement_id TEXT NOT NULL REFERENCES achievements(id) ON DELETE CASCADE,
            progress INTEGER NOT NULL,
            unlocked_at TEXT NOT NULL,
            UNIQUE (user_id, achievement_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS skills (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            icon TEXT NOT NULL,
            category TEXT NOT NULL,
            tier INTEGER NOT NULL,
            cost INTEGER NOT NULL,
            required_level INTEGER NOT NULL,
            effect TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS user_skills (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            skill_id TEXT NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
            is_active INTEGER NOT NULL,
            unlocked_at TEXT NOT NULL,
            UNIQUE (user_id, skill_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS penalties (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            habit_id TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            amount_minor INTEGER NOT NULL,
            destination TEXT NOT NULL,
            reason TEXT,
            is_paid INTEGER NOT NULL,
            payment_ref TEXT,
            created_at TEXT NOT NULL,
            paid_at TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS rewards (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            amount_minor INTEGER NOT NULL,
            reason TEXT,
            is_claimed INTEGER NOT NULL,
            transfer_ref TEXT,
            created_at TEXT NOT NULL,
            claimed_at TEXT
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_completions_user_date ON habit_completions(user_id, date)",
        "CREATE INDEX IF NOT EXISTS idx_penalties_user ON penalties(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_rewards_user ON rewards(user_id)",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| RepoError::database("ensure_schema", e))?;
    }

    Ok(())
}

/// Map an insert/update error, surfacing UNIQUE violations distinctly so
/// workflows can treat them as domain conflicts rather than faults.
pub(crate) fn map_write_err(operation: &'static str, e: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &e {
        if db.message().contains("UNIQUE constraint failed") {
            return RepoError::constraint(db.message().to_string());
        }
    }
    RepoError::database(operation, e)
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(value).map_err(|e| RepoError::serialization(e))
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::serialization(e))
}

pub(crate) fn parse_optional_timestamp(
    value: Option<String>,
) -> Result<Option<DateTime<Utc>>, RepoError> {
    value.as_deref().map(parse_timestamp).transpose()
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, RepoError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| RepoError::serialization(e))
}
