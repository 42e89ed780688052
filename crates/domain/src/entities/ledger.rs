//! Penalty and Reward ledger entries.
//!
//! Penalties are monetary obligations created when a habit is missed;
//! rewards are monetary credits. Both settle through the external payment
//! gateway and carry the gateway's reference once settled. Settlement is
//! idempotent: the first transition wins and later calls are no-ops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::habit::PenaltyDestination;
use crate::ids::{HabitId, PenaltyId, RewardId, UserId};

/// An owed amount tied to a user and the habit that triggered it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Penalty {
    pub id: PenaltyId,
    pub user_id: UserId,
    pub habit_id: HabitId,
    /// Amount owed, in minor currency units.
    pub amount_minor: i64,
    pub destination: PenaltyDestination,
    pub reason: Option<String>,
    pub is_paid: bool,
    /// Payment-provider reference stamped at settlement.
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Penalty {
    pub fn new(
        user_id: UserId,
        habit_id: HabitId,
        amount_minor: i64,
        destination: PenaltyDestination,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PenaltyId::new(),
            user_id,
            habit_id,
            amount_minor,
            destination,
            reason: None,
            is_paid: false,
            payment_ref: None,
            created_at,
            paid_at: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Transition unpaid -> paid, stamping the settlement.
    ///
    /// Returns false without touching anything if already paid, so the
    /// stored reference always reflects the first settlement.
    pub fn settle(&mut self, payment_ref: impl Into<String>, now: DateTime<Utc>) -> bool {
        if self.is_paid {
            return false;
        }
        self.is_paid = true;
        self.payment_ref = Some(payment_ref.into());
        self.paid_at = Some(now);
        true
    }
}

/// A credited amount owed to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: RewardId,
    pub user_id: UserId,
    /// Amount credited, in minor currency units.
    pub amount_minor: i64,
    pub reason: Option<String>,
    pub is_claimed: bool,
    /// Transfer reference stamped when the credit is paid out.
    pub transfer_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl Reward {
    pub fn new(user_id: UserId, amount_minor: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: RewardId::new(),
            user_id,
            amount_minor,
            reason: None,
            is_claimed: false,
            transfer_ref: None,
            created_at,
            claimed_at: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Transition unclaimed -> claimed. No-op if already claimed.
    pub fn claim(&mut self, transfer_ref: Option<String>, now: DateTime<Utc>) -> bool {
        if self.is_claimed {
            return false;
        }
        self.is_claimed = true;
        self.transfer_ref = transfer_ref;
        self.claimed_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
    }

    #[test]
    fn settle_is_idempotent_and_keeps_first_reference() {
        let mut penalty = Penalty::new(
            UserId::new(),
            HabitId::new(),
            1500,
            PenaltyDestination::Cause,
            now(),
        );

        assert!(penalty.settle("pi_first", now()));
        assert!(!penalty.settle("pi_second", later()));

        assert!(penalty.is_paid);
        assert_eq!(penalty.payment_ref.as_deref(), Some("pi_first"));
        assert_eq!(penalty.paid_at, Some(now()));
    }

    #[test]
    fn claim_is_idempotent() {
        let mut reward = Reward::new(UserId::new(), 500, now());
        assert!(reward.claim(Some("tr_1".into()), now()));
        assert!(!reward.claim(Some("tr_2".into()), later()));
        assert_eq!(reward.transfer_ref.as_deref(), Some("tr_1"));
        assert_eq!(reward.claimed_at, Some(now()));
    }
}
