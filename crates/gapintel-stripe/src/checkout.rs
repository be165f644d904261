//! Checkout Sessions for subscription upgrades and one-off report purchases.

use gapintel_core::Tier;
use serde::{Deserialize, Serialize};

use crate::client::StripeClient;
use crate::error::StripeError;

/// What the buyer is paying for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutProduct {
    /// Recurring plan. `price_id` is the tier's configured price.
    Subscription { tier: Tier, price_id: String },
    /// One report for a named channel, paid once.
    SingleReport {
        channel_name: String,
        price_id: String,
    },
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub product: CheckoutProduct,
    pub email: String,
    pub user_id: String,
    /// Public base URL of the app; redirect URLs are derived from it.
    pub app_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

impl CheckoutRequest {
    /// Form fields for `POST /v1/checkout/sessions`.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let app_url = self.app_url.trim_end_matches('/');
        let mut fields = vec![
            ("customer_email".to_string(), self.email.clone()),
            ("client_reference_id".to_string(), self.user_id.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("metadata[user_id]".to_string(), self.user_id.clone()),
            (
                "cancel_url".to_string(),
                format!("{app_url}/pricing?canceled=true"),
            ),
        ];

        match &self.product {
            CheckoutProduct::Subscription { tier, price_id } => {
                fields.extend([
                    ("mode".to_string(), "subscription".to_string()),
                    ("line_items[0][price]".to_string(), price_id.clone()),
                    ("metadata[tier]".to_string(), tier.as_str().to_string()),
                    (
                        "subscription_data[metadata][tier]".to_string(),
                        tier.as_str().to_string(),
                    ),
                    (
                        "success_url".to_string(),
                        format!("{app_url}/dashboard?session_id={{CHECKOUT_SESSION_ID}}&upgraded=true"),
                    ),
                ]);
            }
            CheckoutProduct::SingleReport {
                channel_name,
                price_id,
            } => {
                fields.extend([
                    ("mode".to_string(), "payment".to_string()),
                    ("line_items[0][price]".to_string(), price_id.clone()),
                    ("metadata[channel_name]".to_string(), channel_name.clone()),
                    (
                        "metadata[product]".to_string(),
                        "single_report".to_string(),
                    ),
                    (
                        "success_url".to_string(),
                        format!("{app_url}/dashboard?session_id={{CHECKOUT_SESSION_ID}}"),
                    ),
                ]);
            }
        }
        fields
    }
}

impl StripeClient {
    /// Creates a hosted Checkout Session and returns its redirect URL.
    ///
    /// # Errors
    ///
    /// Returns [`StripeError::Api`] when Stripe rejects the request (for
    /// example an unknown price), [`StripeError::MissingCheckoutUrl`] when the
    /// session has no URL, or a transport error.
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, StripeError> {
        let session: CheckoutSession = self
            .post_form("checkout/sessions", &request.form_fields())
            .await?;

        if session.url.is_none() {
            return Err(StripeError::MissingCheckoutUrl(session.id));
        }

        tracing::info!(
            session_id = %session.id,
            user_id = %request.user_id,
            single_report = matches!(request.product, CheckoutProduct::SingleReport { .. }),
            "checkout session created"
        );
        Ok(session)
    }
}
