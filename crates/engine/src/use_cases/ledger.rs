//! Penalty and reward ledger operations.
//!
//! Settlement transitions are idempotent: marking a penalty paid (or a
//! reward claimed) a second time is a no-op and the stored external
//! reference stays the one from the first settlement.

use std::str::FromStr;
use std::sync::Arc;

use habitquest_domain::{HabitId, Penalty, PenaltyDestination, PenaltyId, Reward, RewardId, UserId};

use crate::infrastructure::ports::{ClockPort, PenaltyRepo, RewardRepo};
use crate::use_cases::validation::{require_non_empty, require_non_negative};
use crate::use_cases::WorkflowError;

pub struct PenaltyLedger {
    penalties: Arc<dyn PenaltyRepo>,
    clock: Arc<dyn ClockPort>,
}

impl PenaltyLedger {
    pub fn new(penalties: Arc<dyn PenaltyRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { penalties, clock }
    }

    /// Penalties for a user, newest first; optionally unpaid only.
    pub async fn list(
        &self,
        user_id: UserId,
        unpaid_only: bool,
    ) -> Result<Vec<Penalty>, WorkflowError> {
        Ok(self.penalties.list_for_user(user_id, unpaid_only).await?)
    }

    /// Record a new obligation against a habit.
    pub async fn create(
        &self,
        user_id: UserId,
        habit_id: HabitId,
        amount_minor: i64,
        destination: &str,
        reason: Option<String>,
    ) -> Result<Penalty, WorkflowError> {
        require_non_negative(amount_minor, "Penalty amount")?;
        let destination = PenaltyDestination::from_str(destination)?;

        let mut penalty = Penalty::new(
            user_id,
            habit_id,
            amount_minor,
            destination,
            self.clock.now(),
        );
        if let Some(reason) = reason {
            require_non_empty(&reason, "Penalty reason")?;
            penalty = penalty.with_reason(reason);
        }

        self.penalties.save(&penalty).await?;
        Ok(penalty)
    }

    /// Transition unpaid -> paid, stamping the external payment reference.
    /// Already-paid penalties are returned unchanged.
    pub async fn mark_paid(
        &self,
        user_id: UserId,
        penalty_id: PenaltyId,
        payment_ref: &str,
    ) -> Result<Penalty, WorkflowError> {
        let mut penalty = self
            .penalties
            .get(penalty_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        if penalty.user_id != user_id {
            return Err(WorkflowError::NotFound);
        }

        if penalty.settle(payment_ref, self.clock.now()) {
            self.penalties.save(&penalty).await?;
        }
        Ok(penalty)
    }
}

pub struct RewardLedger {
    rewards: Arc<dyn RewardRepo>,
    clock: Arc<dyn ClockPort>,
}

impl RewardLedger {
    pub fn new(rewards: Arc<dyn RewardRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { rewards, clock }
    }

    /// Rewards for a user, newest first; optionally unclaimed only.
    pub async fn list(
        &self,
        user_id: UserId,
        unclaimed_only: bool,
    ) -> Result<Vec<Reward>, WorkflowError> {
        Ok(self.rewards.list_for_user(user_id, unclaimed_only).await?)
    }

    /// Record a new credit.
    pub async fn create(
        &self,
        user_id: UserId,
        amount_minor: i64,
        reason: Option<String>,
    ) -> Result<Reward, WorkflowError> {
        require_non_negative(amount_minor, "Reward amount")?;

        let mut reward = Reward::new(user_id, amount_minor, self.clock.now());
        if let Some(reason) = reason {
            require_non_empty(&reason, "Reward reason")?;
            reward = reward.with_reason(reason);
        }

        self.rewards.save(&reward).await?;
        Ok(reward)
    }

    /// Transition unclaimed -> claimed. Already-claimed rewards are
    /// returned unchanged.
    pub async fn mark_claimed(
        &self,
        user_id: UserId,
        reward_id: RewardId,
        transfer_ref: Option<String>,
    ) -> Result<Reward, WorkflowError> {
        let mut reward = self
            .rewards
            .get(reward_id)
            .await?
            .ok_or(WorkflowError::NotFound)?;
        if reward.user_id != user_id {
            return Err(WorkflowError::NotFound);
        }

        if reward.claim(transfer_ref, self.clock.now()) {
            self.rewards.save(&reward).await?;
        }
        Ok(reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockClockPort, MockPenaltyRepo, MockRewardRepo};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::*;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap()
    }

    fn fixed_clock() -> MockClockPort {
        let mut clock = MockClockPort::new();
        clock.expect_now().returning(now);
        clock
    }

    #[tokio::test]
    async fn mark_paid_stamps_reference_once() {
        let user_id = UserId::new();
        let penalty = Penalty::new(
            user_id,
            HabitId::new(),
            1500,
            PenaltyDestination::Cause,
            now(),
        );
        let penalty_id = penalty.id;

        let mut penalties = MockPenaltyRepo::new();
        penalties
            .expect_get()
            .with(eq(penalty_id))
            .returning(move |_| Ok(Some(penalty.clone())));
        penalties
            .expect_save()
            .withf(|p| p.is_paid && p.payment_ref.as_deref() == Some("pi_123"))
            .times(1)
            .returning(|_| Ok(()));

        let ledger = PenaltyLedger::new(Arc::new(penalties), Arc::new(fixed_clock()));
        let paid = ledger
            .mark_paid(user_id, penalty_id, "pi_123")
            .await
            .expect("mark paid");
        assert!(paid.is_paid);
    }

    #[tokio::test]
    async fn mark_paid_twice_is_a_no_op() {
        let user_id = UserId::new();
        let mut penalty = Penalty::new(
            user_id,
            HabitId::new(),
            1500,
            PenaltyDestination::Political,
            now(),
        );
        penalty.settle("pi_first", now());
        let penalty_id = penalty.id;

        let mut penalties = MockPenaltyRepo::new();
        penalties
            .expect_get()
            .returning(move |_| Ok(Some(penalty.clone())));
        // No save expected: the transition already happened.

        let ledger = PenaltyLedger::new(Arc::new(penalties), Arc::new(fixed_clock()));
        let paid = ledger
            .mark_paid(user_id, penalty_id, "pi_second")
            .await
            .expect("mark paid");
        assert_eq!(paid.payment_ref.as_deref(), Some("pi_first"));
    }

    #[tokio::test]
    async fn mark_paid_refuses_foreign_penalty() {
        let owner = UserId::new();
        let penalty = Penalty::new(
            owner,
            HabitId::new(),
            1500,
            PenaltyDestination::Competitor,
            now(),
        );
        let penalty_id = penalty.id;

        let mut penalties = MockPenaltyRepo::new();
        penalties
            .expect_get()
            .returning(move |_| Ok(Some(penalty.clone())));

        let ledger = PenaltyLedger::new(Arc::new(penalties), Arc::new(fixed_clock()));
        let result = ledger.mark_paid(UserId::new(), penalty_id, "pi_123").await;
        assert!(matches!(result, Err(WorkflowError::NotFound)));
    }

    #[tokio::test]
    async fn create_rejects_negative_amounts() {
        let ledger = PenaltyLedger::new(
            Arc::new(MockPenaltyRepo::new()),
            Arc::new(fixed_clock()),
        );
        let result = ledger
            .create(UserId::new(), HabitId::new(), -100, "cause", None)
            .await;
        assert!(matches!(result, Err(WorkflowError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn claim_reward_is_idempotent() {
        let user_id = UserId::new();
        let mut reward = Reward::new(user_id, 500, now());
        reward.claim(Some("tr_first".into()), now());
        let reward_id = reward.id;

        let mut rewards = MockRewardRepo::new();
        rewards
            .expect_get()
            .returning(move |_| Ok(Some(reward.clone())));

        let ledger = RewardLedger::new(Arc::new(rewards), Arc::new(fixed_clock()));
        let claimed = ledger
            .mark_claimed(user_id, reward_id, Some("tr_second".into()))
            .await
            .expect("claim");
        assert_eq!(claimed.transfer_ref.as_deref(), Some("tr_first"));
    }
}
