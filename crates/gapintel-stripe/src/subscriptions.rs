//! Customer and subscription reads used to sync a user's plan.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::client::StripeClient;
use crate::error::StripeError;

/// Statuses that still entitle the customer to their plan, best first.
const LIVE_STATUSES: [&str; 3] = ["active", "trialing", "past_due"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub items: SubscriptionItems,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionItems {
    #[serde(default)]
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    pub price: Price,
    /// Newer API versions report the period on the item instead.
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

impl StripeSubscription {
    #[must_use]
    pub fn price_id(&self) -> Option<&str> {
        self.items.data.first().map(|item| item.price.id.as_str())
    }

    #[must_use]
    pub fn period_end(&self) -> Option<DateTime<Utc>> {
        self.current_period_end
            .or_else(|| self.items.data.first().and_then(|i| i.current_period_end))
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }

    fn is_live(&self) -> bool {
        LIVE_STATUSES.contains(&self.status.as_str())
    }

    /// Position in [`LIVE_STATUSES`]; lower wins when several are live.
    fn live_rank(&self) -> usize {
        LIVE_STATUSES
            .iter()
            .position(|status| *status == self.status)
            .unwrap_or(LIVE_STATUSES.len())
    }
}

/// The customer's current billing state, flattened for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionSnapshot {
    pub customer_id: String,
    pub subscription_id: Option<String>,
    /// Stripe subscription status, or `inactive` when there is none.
    pub status: String,
    pub price_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
}

impl SubscriptionSnapshot {
    /// Picks the subscription that best describes the customer: the first
    /// live one in status priority order, else the most recent.
    #[must_use]
    pub fn from_subscriptions(customer_id: &str, subscriptions: &[StripeSubscription]) -> Self {
        let chosen = subscriptions
            .iter()
            .filter(|s| s.is_live())
            .min_by_key(|s| s.live_rank())
            .or_else(|| subscriptions.first());

        match chosen {
            Some(sub) => Self {
                customer_id: customer_id.to_string(),
                subscription_id: Some(sub.id.clone()),
                status: sub.status.clone(),
                price_id: sub.price_id().map(str::to_string),
                current_period_end: sub.period_end(),
            },
            None => Self {
                customer_id: customer_id.to_string(),
                subscription_id: None,
                status: "inactive".to_string(),
                price_id: None,
                current_period_end: None,
            },
        }
    }

    /// Whether the plan should currently be honoured.
    #[must_use]
    pub fn is_live(&self) -> bool {
        LIVE_STATUSES.contains(&self.status.as_str())
    }
}

impl StripeClient {
    /// Finds the most recent customer with this email.
    ///
    /// # Errors
    ///
    /// Returns a [`StripeError`] on transport or API failure.
    pub async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, StripeError> {
        let list: ListResponse<Customer> = self
            .get("customers", &[("email", email), ("limit", "1")])
            .await?;
        Ok(list.data.into_iter().next())
    }

    /// Lists a customer's subscriptions in every status, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StripeError`] on transport or API failure.
    pub async fn list_subscriptions(
        &self,
        customer_id: &str,
    ) -> Result<Vec<StripeSubscription>, StripeError> {
        let list: ListResponse<StripeSubscription> = self
            .get(
                "subscriptions",
                &[("customer", customer_id), ("status", "all"), ("limit", "10")],
            )
            .await?;
        Ok(list.data)
    }

    /// Looks up the customer by email and summarises their subscription.
    ///
    /// Returns `None` when Stripe has no customer for the email.
    ///
    /// # Errors
    ///
    /// Returns a [`StripeError`] on transport or API failure.
    pub async fn subscription_snapshot(
        &self,
        email: &str,
    ) -> Result<Option<SubscriptionSnapshot>, StripeError> {
        let Some(customer) = self.find_customer_by_email(email).await? else {
            tracing::debug!("no Stripe customer for email");
            return Ok(None);
        };
        let subscriptions = self.list_subscriptions(&customer.id).await?;
        let snapshot = SubscriptionSnapshot::from_subscriptions(&customer.id, &subscriptions);
        tracing::info!(
            customer_id = %snapshot.customer_id,
            status = %snapshot.status,
            live = snapshot.is_live(),
            "subscription snapshot fetched"
        );
        Ok(Some(snapshot))
    }
}
