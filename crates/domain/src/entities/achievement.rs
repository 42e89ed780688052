//! Achievement catalog entries and per-user unlock records.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{AchievementId, UserAchievementId, UserId};

/// Default icon for a catalog achievement.
pub const DEFAULT_ACHIEVEMENT_ICON: &str = "fas fa-trophy";

/// A global, immutable catalog achievement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    /// Threshold the relevant profile counter must reach.
    pub requirement: u32,
    pub exp_reward: i64,
    pub currency_reward: i64,
    pub rarity: Rarity,
    /// Secret achievements are hidden from listings and never auto-unlocked.
    pub is_secret: bool,
}

impl Achievement {
    pub fn new(
        name: impl Into<String>,
        category: AchievementCategory,
        requirement: u32,
    ) -> Self {
        Self {
            id: AchievementId::new(),
            name: name.into(),
            description: String::new(),
            icon: DEFAULT_ACHIEVEMENT_ICON.to_string(),
            category,
            requirement,
            exp_reward: 100,
            currency_reward: 50,
            rarity: Rarity::Common,
            is_secret: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_rewards(mut self, exp: i64, currency: i64) -> Self {
        self.exp_reward = exp;
        self.currency_reward = currency;
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn secret(mut self) -> Self {
        self.is_secret = true;
        self
    }
}

/// Which profile counter an achievement's requirement is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    /// Longest daily completion streak.
    Streak,
    /// Profile level.
    Level,
    /// Total habit completions.
    Habit,
    /// Not tied to a counter; granted by product flows.
    Special,
}

impl AchievementCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Streak => "streak",
            Self::Level => "level",
            Self::Habit => "habit",
            Self::Special => "special",
        }
    }
}

impl FromStr for AchievementCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "streak" => Ok(Self::Streak),
            "level" => Ok(Self::Level),
            "habit" => Ok(Self::Habit),
            "special" => Ok(Self::Special),
            _ => Err(DomainError::parse(format!(
                "Unknown achievement category: {}",
                s
            ))),
        }
    }
}

/// Rarity tier, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

impl FromStr for Rarity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Self::Common),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            _ => Err(DomainError::parse(format!("Unknown rarity: {}", s))),
        }
    }
}

/// The record that a user unlocked an achievement.
///
/// At most one exists per (user, achievement) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    pub id: UserAchievementId,
    pub user_id: UserId,
    pub achievement_id: AchievementId,
    pub progress: u32,
    pub unlocked_at: DateTime<Utc>,
}

impl UserAchievement {
    pub fn new(
        user_id: UserId,
        achievement_id: AchievementId,
        progress: u32,
        unlocked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserAchievementId::new(),
            user_id,
            achievement_id,
            progress,
            unlocked_at,
        }
    }
}
