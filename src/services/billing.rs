// SPDX-License-Identifier: MIT

//! Stripe billing: checkout-session creation and webhook verification.
//!
//! The checkout flow looks up the customer by email, cancels any
//! active/trialing subscription it finds (duplicate-billing guard), then
//! creates a subscription-mode checkout session and hands back the hosted
//! checkout URL. Without a configured API key the service can issue mock
//! URLs so development and tests never touch the network.

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::error::{AppError, Result};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Accepted clock skew on webhook signatures.
const SIGNATURE_TOLERANCE_SECONDS: i64 = 300;

/// A created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub url: String,
    pub mode: &'static str,
}

#[derive(Clone, Default)]
pub struct BillingService {
    http: reqwest::Client,
}

impl BillingService {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Create a checkout session for the subscription plan.
    pub async fn create_checkout_session(
        &self,
        config: &Config,
        email: &str,
        display_name: Option<&str>,
    ) -> Result<CheckoutSession> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AppError::BadRequest("Email is required".to_string()));
        }

        let Some(secret) = config.stripe_secret_key.as_deref() else {
            if !config.stripe_allow_mock {
                return Err(AppError::BadRequest(
                    "Checkout is not configured".to_string(),
                ));
            }
            tracing::info!(customer_email = %email, "Issuing mock checkout URL");
            return Ok(CheckoutSession {
                url: format!(
                    "{}/onboard?checkout=mock&email={}",
                    config.frontend_url,
                    urlencoding::encode(email)
                ),
                mode: "mock",
            });
        };

        let Some(price_id) = config.stripe_price_id.as_deref() else {
            return Err(AppError::BadRequest(
                "STRIPE_PRICE_ID is not configured".to_string(),
            ));
        };

        let customer_id = self.find_customer(secret, email).await?;

        // Cancel any live subscription before selling a new one; a returning
        // customer must never end up double-billed.
        if let Some(customer_id) = customer_id.as_deref() {
            self.cancel_live_subscriptions(secret, customer_id).await?;
        }

        let success_url = format!(
            "{}/onboard?step=3&session_id={{CHECKOUT_SESSION_ID}}",
            config.frontend_url
        );
        let cancel_url = format!("{}/onboard?step=2", config.frontend_url);

        let mut form = vec![
            ("mode".to_string(), "subscription".to_string()),
            ("success_url".to_string(), success_url),
            ("cancel_url".to_string(), cancel_url),
            ("client_reference_id".to_string(), email.to_string()),
            (
                "metadata[display_name]".to_string(),
                display_name.unwrap_or_default().to_string(),
            ),
            ("line_items[0][price]".to_string(), price_id.to_string()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
        ];
        match customer_id {
            Some(id) => form.push(("customer".to_string(), id)),
            None => form.push(("customer_email".to_string(), email.to_string())),
        }

        let payload = self
            .post_form(secret, "checkout/sessions", &form)
            .await?;
        let url = payload
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::PaymentApi("Stripe response missing checkout URL".to_string())
            })?;

        tracing::info!(customer_email = %email, "Checkout session created");
        Ok(CheckoutSession {
            url: url.to_string(),
            mode: "live",
        })
    }

    /// Look up an existing customer id by email.
    async fn find_customer(&self, secret: &str, email: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(format!("{}/customers", STRIPE_API_BASE))
            .bearer_auth(secret)
            .query(&[("email", email), ("limit", "1")])
            .send()
            .await
            .map_err(|err| AppError::PaymentApi(format!("Customer lookup failed: {}", err)))?;
        let payload = read_json(response, "customer lookup").await?;

        Ok(payload
            .get("data")
            .and_then(Value::as_array)
            .and_then(|customers| customers.first())
            .and_then(|customer| customer.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Cancel every active or trialing subscription on a customer.
    async fn cancel_live_subscriptions(&self, secret: &str, customer_id: &str) -> Result<()> {
        let response = self
            .http
            .get(format!("{}/subscriptions", STRIPE_API_BASE))
            .bearer_auth(secret)
            .query(&[("customer", customer_id), ("status", "all")])
            .send()
            .await
            .map_err(|err| AppError::PaymentApi(format!("Subscription list failed: {}", err)))?;
        let payload = read_json(response, "subscription list").await?;

        let subscriptions = payload
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        for subscription in &subscriptions {
            let status = subscription.get("status").and_then(Value::as_str);
            if !matches!(status, Some("active") | Some("trialing")) {
                continue;
            }
            let Some(id) = subscription.get("id").and_then(Value::as_str) else {
                continue;
            };
            tracing::info!(
                customer_id = %customer_id,
                subscription_id = %id,
                "Canceling existing subscription before checkout"
            );
            let response = self
                .http
                .delete(format!("{}/subscriptions/{}", STRIPE_API_BASE, id))
                .bearer_auth(secret)
                .send()
                .await
                .map_err(|err| {
                    AppError::PaymentApi(format!("Subscription cancel failed: {}", err))
                })?;
            read_json(response, "subscription cancel").await?;
        }

        Ok(())
    }

    async fn post_form(
        &self,
        secret: &str,
        path: &str,
        form: &[(String, String)],
    ) -> Result<Value> {
        let response = self
            .http
            .post(format!("{}/{}", STRIPE_API_BASE, path))
            .bearer_auth(secret)
            .form(form)
            .send()
            .await
            .map_err(|err| AppError::PaymentApi(format!("Stripe request failed: {}", err)))?;
        read_json(response, path).await
    }
}

async fn read_json(response: reqwest::Response, context: &str) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::PaymentApi(format!(
            "Stripe {} failed ({}): {}",
            context, status, body
        )));
    }
    response
        .json()
        .await
        .map_err(|err| AppError::PaymentApi(format!("Invalid Stripe response: {}", err)))
}

/// Verify a `stripe-signature` header against the raw request body.
///
/// Header format: `t=<unix>,v1=<hex hmac>[,v1=...]`. The signed payload is
/// `"{t}.{body}"` under HMAC-SHA256 with the endpoint secret; comparison is
/// constant-time.
pub fn verify_webhook_signature(
    secret: &str,
    signature_header: &str,
    payload: &[u8],
    now_unix: i64,
) -> Result<()> {
    let invalid = || AppError::InvalidToken;

    let mut timestamp: Option<i64> = None;
    let mut v1_signatures: Vec<Vec<u8>> = Vec::new();

    for part in signature_header.split(',') {
        let mut iter = part.trim().splitn(2, '=');
        let key = iter.next().unwrap_or("").trim();
        let value = iter.next().unwrap_or("").trim();
        match key {
            "t" => timestamp = value.parse::<i64>().ok(),
            "v1" => {
                let decoded = hex::decode(value).map_err(|_| invalid())?;
                v1_signatures.push(decoded);
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(invalid)?;
    if v1_signatures.is_empty() {
        return Err(invalid());
    }
    if (now_unix - timestamp).abs() > SIGNATURE_TOLERANCE_SECONDS {
        return Err(invalid());
    }

    let mut signed_payload = timestamp.to_string().into_bytes();
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(payload);

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid webhook secret")))?;
    mac.update(&signed_payload);
    let expected = mac.finalize().into_bytes();

    for candidate in v1_signatures {
        if candidate.as_slice().ct_eq(expected.as_slice()).into() {
            return Ok(());
        }
    }

    Err(invalid())
}

/// Build a valid signature header for a payload; test helper.
pub fn sign_webhook_payload(secret: &str, payload: &[u8], timestamp: i64) -> String {
    let mut signed_payload = timestamp.to_string().into_bytes();
    signed_payload.push(b'.');
    signed_payload.extend_from_slice(payload);

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(&signed_payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}
