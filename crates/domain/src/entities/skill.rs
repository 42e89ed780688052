//! Skill catalog entries and per-user unlock records.
//!
//! Skills are global, tiered perks bought with in-game currency. Unlocking
//! is gated by both the required level and the cost; the unlock evaluator
//! enforces both before any record is created.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{SkillId, UserId, UserSkillId};

/// Default icon for a catalog skill.
pub const DEFAULT_SKILL_ICON: &str = "fas fa-star";

/// A perk a user can unlock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: SkillCategory,
    /// Position in the skill tree; higher tiers sit behind lower ones.
    pub tier: u32,
    /// Currency cost to unlock.
    pub cost: i64,
    pub required_level: u32,
    /// Machine-readable effect descriptor consumed by the UI.
    pub effect: Option<String>,
}

impl Skill {
    pub fn new(name: impl Into<String>, category: SkillCategory, tier: u32) -> Self {
        Self {
            id: SkillId::new(),
            name: name.into(),
            description: String::new(),
            icon: DEFAULT_SKILL_ICON.to_string(),
            category,
            tier,
            cost: 100,
            required_level: 1,
            effect: None,
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

    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_required_level(mut self, level: u32) -> Self {
        self.required_level = level;
        self
    }

    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }
}

/// How a skill applies once unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    /// Always on.
    Passive,
    /// Triggered by the user.
    Active,
    /// Top-tier, one-per-build perks.
    Ultimate,
}

impl SkillCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::Active => "active",
            Self::Ultimate => "ultimate",
        }
    }
}

impl FromStr for SkillCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passive" => Ok(Self::Passive),
            "active" => Ok(Self::Active),
            "ultimate" => Ok(Self::Ultimate),
            _ => Err(DomainError::parse(format!("Unknown skill category: {}", s))),
        }
    }
}

/// The record that a user unlocked a skill.
///
/// At most one exists per (user, skill) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSkill {
    pub id: UserSkillId,
    pub user_id: UserId,
    pub skill_id: SkillId,
    pub is_active: bool,
    pub unlocked_at: DateTime<Utc>,
}

impl UserSkill {
    pub fn new(user_id: UserId, skill_id: SkillId, unlocked_at: DateTime<Utc>) -> Self {
        Self {
            id: UserSkillId::new(),
            user_id,
            skill_id,
            is_active: true,
            unlocked_at,
        }
    }
}
