//! Habit entity - a recurring user-defined task.
//!
//! Habits carry an experience reward for completion and a monetary penalty
//! for missing a day. Deleting a habit only clears its active flag so the
//! completion history stays intact.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{HabitId, UserId};

/// Default experience reward for a new habit.
pub const DEFAULT_HABIT_EXP_REWARD: i64 = 50;

/// Default penalty for a missed habit, in minor currency units ($15.00).
pub const DEFAULT_PENALTY_MINOR: i64 = 1500;

/// Default icon for a new habit.
pub const DEFAULT_HABIT_ICON: &str = "fas fa-check";

/// A recurring task owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub category: HabitCategory,
    pub icon: String,
    pub exp_reward: i64,
    /// Amount owed per missed day, in minor currency units.
    pub penalty_minor: i64,
    pub penalty_destination: Option<PenaltyDestination>,
    pub is_active: bool,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(
        user_id: UserId,
        name: impl Into<String>,
        category: HabitCategory,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: HabitId::new(),
            user_id,
            name: name.into(),
            description: None,
            category,
            icon: DEFAULT_HABIT_ICON.to_string(),
            exp_reward: DEFAULT_HABIT_EXP_REWARD,
            penalty_minor: DEFAULT_PENALTY_MINOR,
            penalty_destination: None,
            is_active: true,
            current_streak: 0,
            longest_streak: 0,
            total_completions: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_exp_reward(mut self, exp_reward: i64) -> Self {
        self.exp_reward = exp_reward;
        self
    }

    pub fn with_penalty(mut self, amount_minor: i64, destination: PenaltyDestination) -> Self {
        self.penalty_minor = amount_minor;
        self.penalty_destination = Some(destination);
        self
    }

    /// Record a completion against the streak counters.
    ///
    /// `continued` is whether the previous calendar day was also completed.
    pub fn record_completion(&mut self, continued: bool, now: DateTime<Utc>) {
        self.current_streak = if continued {
            self.current_streak + 1
        } else {
            1
        };
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.total_completions += 1;
        self.updated_at = now;
    }

    /// Soft delete: the habit disappears from active lists but its
    /// completion history survives.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }
}

/// Life areas a habit can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitCategory {
    Physical,
    Mental,
    Knowledge,
    Social,
}

impl HabitCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Physical => "physical",
            Self::Mental => "mental",
            Self::Knowledge => "knowledge",
            Self::Social => "social",
        }
    }
}

impl FromStr for HabitCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physical" => Ok(Self::Physical),
            "mental" => Ok(Self::Mental),
            "knowledge" => Ok(Self::Knowledge),
            "social" => Ok(Self::Social),
            _ => Err(DomainError::parse(format!("Unknown habit category: {}", s))),
        }
    }
}

/// Where a collected penalty is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyDestination {
    /// A political organization the user opposes.
    Political,
    /// A competitor of the user's choosing.
    Competitor,
    /// A charitable cause.
    Cause,
}

impl PenaltyDestination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Political => "political",
            Self::Competitor => "competitor",
            Self::Cause => "cause",
        }
    }
}

impl FromStr for PenaltyDestination {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "political" => Ok(Self::Political),
            "competitor" => Ok(Self::Competitor),
            "cause" => Ok(Self::Cause),
            _ => Err(DomainError::parse(format!(
                "Unknown penalty destination: {}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn new_habit_uses_defaults() {
        let habit = Habit::new(UserId::new(), "Morning run", HabitCategory::Physical, now());
        assert_eq!(habit.exp_reward, DEFAULT_HABIT_EXP_REWARD);
        assert_eq!(habit.penalty_minor, DEFAULT_PENALTY_MINOR);
        assert!(habit.is_active);
        assert_eq!(habit.total_completions, 0);
    }

    #[test]
    fn record_completion_tracks_streaks() {
        let mut habit = Habit::new(UserId::new(), "Read", HabitCategory::Knowledge, now());
        habit.record_completion(false, now());
        habit.record_completion(true, now());
        assert_eq!(habit.current_streak, 2);
        assert_eq!(habit.longest_streak, 2);
        assert_eq!(habit.total_completions, 2);

        habit.record_completion(false, now());
        assert_eq!(habit.current_streak, 1);
        assert_eq!(habit.longest_streak, 2);
        assert_eq!(habit.total_completions, 3);
    }

    #[test]
    fn deactivate_clears_active_flag_only() {
        let mut habit = Habit::new(UserId::new(), "Meditate", HabitCategory::Mental, now());
        habit.record_completion(false, now());
        habit.deactivate(now());
        assert!(!habit.is_active);
        assert_eq!(habit.total_completions, 1, "history survives deactivation");
    }

    #[test]
    fn serializes_with_camel_case_wire_names() {
        let habit = Habit::new(UserId::new(), "Morning run", HabitCategory::Physical, now())
            .with_exp_reward(75)
            .with_penalty(1500, PenaltyDestination::Cause);
        let value = serde_json::to_value(&habit).expect("serialize");

        assert_eq!(value["category"], "physical");
        assert_eq!(value["expReward"], 75);
        assert_eq!(value["penaltyMinor"], 1500);
        assert_eq!(value["penaltyDestination"], "cause");
        assert_eq!(value["isActive"], true);
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in [
            HabitCategory::Physical,
            HabitCategory::Mental,
            HabitCategory::Knowledge,
            HabitCategory::Social,
        ] {
            assert_eq!(category.as_str().parse::<HabitCategory>().ok(), Some(category));
        }
        assert!("weekly".parse::<HabitCategory>().is_err());
    }
}
