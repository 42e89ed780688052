//! Port for the external payment gateway.
//!
//! The gateway is opaque: it takes an amount in minor currency units plus
//! metadata and answers with a client-side confirmation token. Settlement
//! arrives later through the confirmation callback, which the ledger
//! consumes; this port never mutates ledger state itself.

use async_trait::async_trait;
use habitquest_domain::{PenaltyId, UserId};

use super::error::GatewayError;

/// A created payment intent, as handed back to the UI.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    /// Provider-side identifier, later echoed by the confirmation callback.
    pub id: String,
    /// Client-side confirmation token.
    pub client_secret: String,
}

/// Metadata attached to a payment intent for reconciliation.
#[derive(Debug, Clone)]
pub struct PaymentMetadata {
    pub user_id: UserId,
    pub penalty_ids: Vec<PenaltyId>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    /// Whether provider credentials are present. When false, payment
    /// endpoints answer "not configured" instead of failing.
    fn is_configured(&self) -> bool;

    /// Create a payment intent for `amount_minor` (minor currency units).
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: &PaymentMetadata,
    ) -> Result<PaymentIntent, GatewayError>;
}
