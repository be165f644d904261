//! Minimal Stripe REST client: Checkout Sessions for purchases and the
//! customer/subscription reads needed to sync a user's tier.

pub mod checkout;
pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod subscriptions;

pub use checkout::{CheckoutProduct, CheckoutRequest, CheckoutSession};
pub use client::StripeClient;
pub use error::StripeError;
pub use subscriptions::{Customer, StripeSubscription, SubscriptionSnapshot};
