//! Stripe payment gateway client.
//!
//! Talks to the PaymentIntents API over its form-encoded HTTP surface.
//! When no secret key is configured, [`DisabledGateway`] stands in and
//! answers every call with `NotConfigured`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::infrastructure::ports::{
    GatewayError, PaymentGatewayPort, PaymentIntent, PaymentMetadata,
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Environment variable holding the Stripe secret key.
pub const STRIPE_SECRET_KEY_VAR: &str = "STRIPE_SECRET_KEY";

pub struct StripeGateway {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(secret_key: &str) -> Self {
        Self::with_base_url(secret_key, STRIPE_API_BASE)
    }

    /// Point the client at a different base URL (for testing).
    pub fn with_base_url(secret_key: &str, base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    /// Build from `STRIPE_SECRET_KEY`, or None when the key is absent.
    pub fn from_env() -> Option<Self> {
        std::env::var(STRIPE_SECRET_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(&key))
    }
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    id: String,
    client_secret: String,
}

#[async_trait]
impl PaymentGatewayPort for StripeGateway {
    fn is_configured(&self) -> bool {
        true
    }

    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: &PaymentMetadata,
    ) -> Result<PaymentIntent, GatewayError> {
        let penalty_ids = serde_json::to_string(&metadata.penalty_ids)
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        let params = [
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_string()),
            ("metadata[user_id]", metadata.user_id.to_string()),
            ("metadata[penalty_ids]", penalty_ids),
        ];

        let response = self
            .client
            .post(format!("{}/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;
            return Err(GatewayError::RequestFailed(error_text));
        }

        let intent: PaymentIntentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }
}

/// Stand-in used when no provider credentials are configured.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGatewayPort for DisabledGateway {
    fn is_configured(&self) -> bool {
        false
    }

    async fn create_payment_intent(
        &self,
        _amount_minor: i64,
        _currency: &str,
        _metadata: &PaymentMetadata,
    ) -> Result<PaymentIntent, GatewayError> {
        Err(GatewayError::NotConfigured)
    }
}
