//! Progression Engine - pure level/experience/currency arithmetic.
//!
//! Experience accumulates monotonically: crossing a level threshold bumps
//! the level and raises the threshold, but the running total is never reset
//! or reduced. Currency accrues at a flat rate per completion, independent
//! of the habit's reward size.

use serde::{Deserialize, Serialize};

/// Experience granted when a habit carries no explicit reward.
pub const DEFAULT_EXP_REWARD: i64 = 50;

/// Flat currency grant per completion.
pub const COMPLETION_CURRENCY: i64 = 10;

/// Experience threshold to clear the given level.
pub fn experience_to_next(level: u32) -> i64 {
    i64::from(level) * 100
}

/// The slice of a profile the progression rules read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub level: u32,
    pub experience: i64,
    pub experience_to_next: i64,
    pub currency: i64,
}

impl ProgressionState {
    /// Apply one habit completion.
    ///
    /// A non-positive reward falls back to [`DEFAULT_EXP_REWARD`]. If the
    /// new total reaches the threshold, the level increments once and the
    /// threshold becomes `new_level * 100`; excess experience is NOT
    /// carried against the next threshold (the total is only ever compared,
    /// never subtracted from).
    pub fn apply_completion(self, exp_reward: i64) -> Self {
        let reward = if exp_reward > 0 {
            exp_reward
        } else {
            DEFAULT_EXP_REWARD
        };
        let mut next = self.grant_experience(reward);
        next.currency += COMPLETION_CURRENCY;
        next
    }

    /// Add experience and resolve at most one level-up against the
    /// threshold. Used for completions and achievement grants alike.
    pub fn grant_experience(self, exp: i64) -> Self {
        let new_exp = self.experience + exp;
        if new_exp >= self.experience_to_next {
            let new_level = self.level + 1;
            Self {
                level: new_level,
                experience: new_exp,
                experience_to_next: experience_to_next(new_level),
                currency: self.currency,
            }
        } else {
            Self {
                experience: new_exp,
                ..self
            }
        }
    }

    /// Add currency directly (achievement rewards).
    pub fn grant_currency(self, amount: i64) -> Self {
        Self {
            currency: self.currency + amount,
            ..self
        }
    }
}
