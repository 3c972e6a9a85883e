//! Checkout-session client for the Stripe API.
//!
//! Requests are form-encoded, responses are JSON, authentication is the
//! secret key as a bearer token. Amounts on the wire are integer minor
//! units (cents); conversion to `Decimal` happens at the edge here so the
//! rest of the crate only sees store-currency decimals.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Deserialize;

use tamarind_core::{OrderId, UserId};

use super::PaymentError;
use crate::config::StripeConfig;

/// Session payment state as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

/// A checkout session, possibly with expanded payment data.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page URL; present on freshly created sessions.
    pub url: Option<String>,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub payment_intent: Option<PaymentIntent>,
}

/// Expanded payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub latest_charge: Option<Charge>,
}

/// Expanded charge.
#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub id: String,
    pub balance_transaction: Option<BalanceTransaction>,
}

/// Fee breakdown for a settled charge, in minor units.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceTransaction {
    pub fee: i64,
    pub net: i64,
}

impl BalanceTransaction {
    /// Provider fee in the store currency.
    #[must_use]
    pub fn fee_decimal(&self) -> Decimal {
        Decimal::new(self.fee, 2)
    }

    /// Net payout in the store currency.
    #[must_use]
    pub fn net_decimal(&self) -> Decimal {
        Decimal::new(self.net, 2)
    }
}

impl CheckoutSession {
    /// Order id and user id carried in the session metadata, when both are
    /// present and well-formed.
    ///
    /// Confirmation refuses sessions without this pair, whatever their
    /// payment status: metadata is what ties an opaque session id back to
    /// an order we created, and an arbitrary (replayed or forged) session
    /// id won't carry it.
    #[must_use]
    pub fn order_metadata(&self) -> Option<(OrderId, UserId)> {
        let order_id = self.metadata.get("order_id")?.parse::<OrderId>().ok()?;
        let user_id = self.metadata.get("user_id")?.parse::<UserId>().ok()?;
        Some((order_id, user_id))
    }

    /// Fee breakdown, when charge data was expanded and has settled.
    #[must_use]
    pub fn balance_transaction(&self) -> Option<&BalanceTransaction> {
        self.payment_intent
            .as_ref()?
            .latest_charge
            .as_ref()?
            .balance_transaction
            .as_ref()
    }
}

/// One line item for session creation.
#[derive(Debug, Clone)]
pub struct CheckoutLineItem {
    pub name: String,
    /// Unit amount in the store currency.
    pub unit_amount: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Client for the provider's checkout-session API.
///
/// Cheaply cloneable; holds the HTTP client and credentials behind an
/// `Arc`.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    /// Currency all sessions are created in.
    const CURRENCY: &'static str = "usd";

    /// Create a new client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            inner: Arc::new(StripeClientInner {
                client: reqwest::Client::new(),
                api_base: config.api_base.trim_end_matches('/').to_string(),
                secret_key: config.secret_key.expose_secret().to_string(),
            }),
        }
    }

    /// Create a checkout session for an order.
    ///
    /// The order and user ids ride along as session metadata; confirmation
    /// requires them back.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] if the request fails or the response does
    /// not parse.
    pub async fn create_checkout_session(
        &self,
        order_id: OrderId,
        user_id: UserId,
        email: &str,
        line_items: &[CheckoutLineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("customer_email".into(), email.into()),
            ("success_url".into(), success_url.into()),
            ("cancel_url".into(), cancel_url.into()),
            ("metadata[order_id]".into(), order_id.to_string()),
            ("metadata[user_id]".into(), user_id.to_string()),
        ];

        for (i, item) in line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                Self::CURRENCY.into(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                to_minor_units(item.unit_amount).to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        self.post_form("/v1/checkout/sessions", &form).await
    }

    /// Retrieve a checkout session with expanded charge and fee data.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] if the request fails or the response does
    /// not parse.
    pub async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, PaymentError> {
        let url = format!(
            "{}/v1/checkout/sessions/{session_id}",
            self.inner.api_base
        );

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(&self.inner.secret_key)
            .query(&[(
                "expand[]",
                "payment_intent.latest_charge.balance_transaction",
            )])
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn post_form(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}{path}", self.inner.api_base);

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(&self.inner.secret_key)
            .form(form)
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// Read the body as text first so API errors can carry the provider's
    /// message instead of a bare status code.
    async fn read_json(response: reqwest::Response) -> Result<CheckoutSession, PaymentError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Convert a store-currency amount to integer minor units, rounding to the
/// nearest cent.
fn to_minor_units(amount: Decimal) -> i64 {
    use rust_decimal::prelude::ToPrimitive;

    (amount * Decimal::from(100))
        .round()
        .to_i64()
        .unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn minor_unit_conversion_rounds_to_cents() {
        assert_eq!(to_minor_units(Decimal::from_str_exact("35").unwrap()), 3500);
        assert_eq!(
            to_minor_units(Decimal::from_str_exact("9.99").unwrap()),
            999
        );
        assert_eq!(
            to_minor_units(Decimal::from_str_exact("0.005").unwrap()),
            0
        );
    }

    #[test]
    fn parses_created_session() {
        let body = r#"{
            "id": "cs_test_a1b2c3",
            "object": "checkout.session",
            "url": "https://checkout.stripe.com/c/pay/cs_test_a1b2c3",
            "payment_status": "unpaid",
            "metadata": {"order_id": "42", "user_id": "7"},
            "payment_intent": null
        }"#;

        let session: CheckoutSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.id, "cs_test_a1b2c3");
        assert_eq!(session.payment_status, PaymentStatus::Unpaid);
        assert!(session.url.is_some());
        assert_eq!(
            session.order_metadata(),
            Some((OrderId::new(42), UserId::new(7)))
        );
    }

    #[test]
    fn parses_expanded_paid_session_with_fees() {
        let body = r#"{
            "id": "cs_test_a1b2c3",
            "url": null,
            "payment_status": "paid",
            "metadata": {"order_id": "42", "user_id": "7"},
            "payment_intent": {
                "id": "pi_123",
                "latest_charge": {
                    "id": "ch_456",
                    "balance_transaction": {"fee": 247, "net": 7253}
                }
            }
        }"#;

        let session: CheckoutSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.payment_status, PaymentStatus::Paid);

        let tx = session.balance_transaction().unwrap();
        assert_eq!(tx.fee_decimal(), Decimal::from_str_exact("2.47").unwrap());
        assert_eq!(tx.net_decimal(), Decimal::from_str_exact("72.53").unwrap());
    }

    #[test]
    fn missing_metadata_yields_no_order_reference() {
        let body = r#"{
            "id": "cs_test_forged",
            "url": null,
            "payment_status": "paid",
            "metadata": {},
            "payment_intent": null
        }"#;

        let session: CheckoutSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.payment_status, PaymentStatus::Paid);
        assert!(session.order_metadata().is_none());
    }

    #[test]
    fn partial_metadata_is_rejected() {
        let body = r#"{
            "id": "cs_test",
            "url": null,
            "payment_status": "paid",
            "metadata": {"order_id": "42"},
            "payment_intent": null
        }"#;

        let session: CheckoutSession = serde_json::from_str(body).unwrap();
        assert!(session.order_metadata().is_none());
    }

    #[test]
    fn malformed_metadata_ids_are_rejected() {
        let body = r#"{
            "id": "cs_test",
            "url": null,
            "payment_status": "paid",
            "metadata": {"order_id": "not-a-number", "user_id": "7"},
            "payment_intent": null
        }"#;

        let session: CheckoutSession = serde_json::from_str(body).unwrap();
        assert!(session.order_metadata().is_none());
    }
}
