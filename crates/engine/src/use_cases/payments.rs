//! Payment intent creation and confirmation.
//!
//! Creating an intent is read-only against the ledger: the gateway call
//! happens before any mutation, so a gateway failure leaves every penalty
//! untouched. Settlement only happens in the confirmation path, one
//! penalty at a time, each idempotently.

use std::sync::Arc;

use habitquest_domain::{Penalty, PenaltyId, UserId};

use crate::infrastructure::ports::{
    GatewayError, PaymentGatewayPort, PaymentIntent, PaymentMetadata, PenaltyRepo,
};
use crate::use_cases::ledger::PenaltyLedger;
use crate::use_cases::WorkflowError;

/// ISO currency the gateway charges in.
const CHARGE_CURRENCY: &str = "usd";

pub struct PaymentFlows {
    penalties: Arc<dyn PenaltyRepo>,
    ledger: Arc<PenaltyLedger>,
    gateway: Arc<dyn PaymentGatewayPort>,
}

impl PaymentFlows {
    pub fn new(
        penalties: Arc<dyn PenaltyRepo>,
        ledger: Arc<PenaltyLedger>,
        gateway: Arc<dyn PaymentGatewayPort>,
    ) -> Self {
        Self {
            penalties,
            ledger,
            gateway,
        }
    }

    /// Charge the sum of the selected unpaid penalties. Returns the
    /// gateway's client confirmation token; no ledger state changes here.
    pub async fn create_intent(
        &self,
        user_id: UserId,
        penalty_ids: Vec<PenaltyId>,
    ) -> Result<PaymentIntent, WorkflowError> {
        if penalty_ids.is_empty() {
            return Err(WorkflowError::InvalidInput(
                "no penalties selected".to_string(),
            ));
        }

        let mut total_minor = 0i64;
        for penalty_id in &penalty_ids {
            let penalty = self
                .penalties
                .get(*penalty_id)
                .await?
                .ok_or(WorkflowError::NotFound)?;
            if penalty.user_id != user_id {
                return Err(WorkflowError::NotFound);
            }
            if penalty.is_paid {
                return Err(WorkflowError::InvalidInput(format!(
                    "penalty {} is already paid",
                    penalty_id
                )));
            }
            total_minor += penalty.amount_minor;
        }

        let metadata = PaymentMetadata {
            user_id,
            penalty_ids,
        };
        let intent = self
            .gateway
            .create_payment_intent(total_minor, CHARGE_CURRENCY, &metadata)
            .await?;

        tracing::info!(user_id = %user_id, amount_minor = total_minor, "Created payment intent");
        Ok(intent)
    }

    /// Gateway success callback: stamp each referenced penalty paid.
    /// Individual transitions are idempotent, so a replayed callback is
    /// harmless.
    pub async fn confirm(
        &self,
        user_id: UserId,
        payment_ref: &str,
        penalty_ids: Vec<PenaltyId>,
    ) -> Result<Vec<Penalty>, WorkflowError> {
        if !self.gateway.is_configured() {
            return Err(GatewayError::NotConfigured.into());
        }

        let mut settled = Vec::with_capacity(penalty_ids.len());
        for penalty_id in penalty_ids {
            settled.push(self.ledger.mark_paid(user_id, penalty_id, payment_ref).await?);
        }
        Ok(settled)
    }
}
