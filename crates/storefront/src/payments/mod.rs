//! Payment provider integration.
//!
//! A thin, hand-rolled HTTP client for the card payment provider's
//! checkout-session API. Two operations are used: creating a session at
//! checkout and retrieving it (with expanded charge/fee data) at
//! confirmation time. No vendor SDK.

mod stripe;

pub use stripe::{
    BalanceTransaction, Charge, CheckoutLineItem, CheckoutSession, PaymentIntent, PaymentStatus,
    StripeClient,
};

/// Errors from the payment provider.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The HTTP request failed (network, TLS, timeout).
    #[error("payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-success status.
    #[error("payment provider returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
    },

    /// The provider's response body did not parse.
    #[error("failed to parse payment provider response: {0}")]
    Parse(#[from] serde_json::Error),
}
