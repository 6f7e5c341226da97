// SPDX-License-Identifier: MIT

//! Public checkout endpoint and the Stripe webhook.
//!
//! These routes run before any session exists, so they sit outside the auth
//! middleware and use a permissive CORS policy (the preflight OPTIONS is
//! answered by the CORS layer).

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::error::{AppError, Result};
use crate::models::session::SessionState;
use crate::models::user::{
    Inventory, Subscription, SubscriptionStatus, UserProfile, UserStats,
};
use crate::services::billing;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/checkout", post(create_checkout))
        .route("/api/webhook/stripe", post(stripe_webhook))
        .layer(CorsLayer::permissive())
}

// ─── Checkout ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CheckoutRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default, alias = "displayName")]
    display_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckoutResponse {
    url: String,
}

/// Create a checkout session for the subscription plan and return the
/// hosted checkout URL.
async fn create_checkout(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let email = request.email.as_deref().unwrap_or("");
    let session = state
        .billing
        .create_checkout_session(&state.config, email, request.display_name.as_deref())
        .await?;

    Ok(Json(CheckoutResponse { url: session.url }))
}

// ─── Stripe Webhook ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StripeWebhookPayload {
    #[serde(rename = "type")]
    event_type: String,
    data: StripeWebhookData,
}

#[derive(Debug, Deserialize)]
struct StripeWebhookData {
    object: Value,
}

#[derive(Debug, Serialize)]
struct WebhookResponse {
    received: bool,
}

/// Handle `checkout.session.completed`: activate the subscription for the
/// paying email. The webhook can land before onboarding finishes, so the
/// session is created on the fly when missing.
async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>> {
    let Some(secret) = state.config.stripe_webhook_secret.as_deref() else {
        return Err(AppError::NotFound(
            "Stripe webhook endpoint is disabled".to_string(),
        ));
    };

    let signature_header = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::InvalidToken)?;

    let now = Utc::now();
    billing::verify_webhook_signature(secret, signature_header, &body, now.timestamp())?;

    let payload: StripeWebhookPayload = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid Stripe webhook payload".to_string()))?;

    if payload.event_type != "checkout.session.completed" {
        return Err(AppError::BadRequest(format!(
            "Unhandled webhook event type: {}",
            payload.event_type
        )));
    }

    let email = session_email(&payload.data.object)
        .ok_or_else(|| AppError::BadRequest("Stripe webhook missing customer email".to_string()))?
        .to_ascii_lowercase();
    let display_name = payload
        .data
        .object
        .get("metadata")
        .and_then(|metadata| metadata.get("display_name"))
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string);

    let user_id = UserProfile::id_for_email(&email);
    let init_email = email.clone();
    state
        .sessions
        .with_session_or_create(
            user_id,
            || {
                let display_name = display_name.clone().unwrap_or_else(|| {
                    init_email.split('@').next().unwrap_or("Traveler").to_string()
                });
                let profile = UserProfile {
                    id: user_id,
                    email: init_email.clone(),
                    display_name,
                    subscription: Subscription::trial(now),
                    stats: UserStats::default(),
                    inventory: Inventory::starter(),
                    created_at: now,
                };
                SessionState::new(profile, now)
            },
            |session| {
                session.user.subscription = Subscription {
                    status: SubscriptionStatus::Active,
                    trial_end: None,
                    current_period_end: Some(now + chrono::Duration::days(30)),
                };
                Ok(())
            },
        )
        .await?;

    tracing::info!(user_id = %user_id, "Subscription activated via webhook");
    Ok(Json(WebhookResponse { received: true }))
}

fn session_email(object: &Value) -> Option<String> {
    object
        .get("customer_email")
        .and_then(Value::as_str)
        .or_else(|| {
            object
                .get("customer_details")
                .and_then(|details| details.get("email"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_email_prefers_top_level_field() {
        let object: Value = serde_json::json!({
            "customer_email": "fogg@reform.club",
            "customer_details": { "email": "other@reform.club" }
        });
        assert_eq!(session_email(&object).as_deref(), Some("fogg@reform.club"));
    }

    #[test]
    fn test_session_email_falls_back_to_customer_details() {
        let object: Value = serde_json::json!({
            "customer_details": { "email": "aouda@reform.club" }
        });
        assert_eq!(session_email(&object).as_deref(), Some("aouda@reform.club"));
    }

    #[test]
    fn test_session_email_missing() {
        assert!(session_email(&serde_json::json!({})).is_none());
    }
}
