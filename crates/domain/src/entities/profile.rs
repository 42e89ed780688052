//! UserProfile entity - the player-side view of a user.
//!
//! Holds the gamification state (level, experience, currency, streaks) and
//! per-category stat scores. Authentication identity lives elsewhere; the
//! profile only carries what the progression rules read and write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::progression::{self, ProgressionState};

/// Default character class for new profiles.
pub const DEFAULT_CHARACTER_CLASS: &str = "Shadow Assassin";

/// Default title for new profiles.
pub const DEFAULT_TITLE: &str = "Shadow Hunter";

/// Per-category stat scores shown on the character sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub strength: u32,
    pub intelligence: u32,
    pub discipline: u32,
    pub social: u32,
}

impl Default for CategoryStats {
    fn default() -> Self {
        Self {
            strength: 10,
            intelligence: 10,
            discipline: 10,
            social: 10,
        }
    }
}

/// A user's gamification profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub level: u32,
    pub experience: i64,
    pub experience_to_next: i64,
    pub currency: i64,
    pub character_class: String,
    pub title: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_achievements: u32,
    pub stats: CategoryStats,
    /// Customer handle at the payment provider, once one exists.
    pub gateway_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: None,
            display_name: None,
            level: 1,
            experience: 0,
            experience_to_next: progression::experience_to_next(1),
            currency: 0,
            character_class: DEFAULT_CHARACTER_CLASS.to_string(),
            title: DEFAULT_TITLE.to_string(),
            current_streak: 0,
            longest_streak: 0,
            total_achievements: 0,
            stats: CategoryStats::default(),
            gateway_customer_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// The progression-relevant slice of the profile.
    pub fn progression(&self) -> ProgressionState {
        ProgressionState {
            level: self.level,
            experience: self.experience,
            experience_to_next: self.experience_to_next,
            currency: self.currency,
        }
    }

    /// Write back an updated progression state.
    pub fn apply_progression(&mut self, state: ProgressionState) {
        self.level = state.level;
        self.experience = state.experience;
        self.experience_to_next = state.experience_to_next;
        self.currency = state.currency;
    }

    /// Extend or restart the daily completion streak.
    ///
    /// `continued` is whether the previous calendar day had at least one
    /// completion. Longest streak ratchets up, never down.
    pub fn advance_streak(&mut self, continued: bool) {
        self.current_streak = if continued {
            self.current_streak + 1
        } else {
            1
        };
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }
}
