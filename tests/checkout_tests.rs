// SPDX-License-Identifier: MIT

//! Checkout endpoint and Stripe webhook tests (mock billing mode).

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::Utc;
use tower::ServiceExt;

use eighty_ways::services::billing::sign_webhook_payload;

mod common;

#[tokio::test]
async fn test_checkout_requires_an_email() {
    let (app, _state) = common::create_test_app();

    let response = common::post_json(&app, "/api/checkout", None, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::read_json(response).await;
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["details"], "Email is required");
}

#[tokio::test]
async fn test_blank_email_is_also_rejected() {
    let (app, _state) = common::create_test_app();

    let response = common::post_json(
        &app,
        "/api/checkout",
        None,
        serde_json::json!({ "email": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mock_checkout_returns_a_url() {
    let (app, _state) = common::create_test_app();

    let response = common::post_json(
        &app,
        "/api/checkout",
        None,
        serde_json::json!({ "email": "fogg@reform.club", "display_name": "Phileas" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::read_json(response).await;
    let url = body["url"].as_str().unwrap();
    assert!(url.contains("checkout=mock"));
}

#[tokio::test]
async fn test_checkout_answers_cors_preflight() {
    let (app, _state) = common::create_test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/checkout")
                .header(header::ORIGIN, "https://anywhere.example")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_webhook_rejects_missing_signature() {
    let (app, _state) = common::create_test_app();

    let response = common::post_json(
        &app,
        "/api/webhook/stripe",
        None,
        serde_json::json!({ "type": "checkout.session.completed", "data": { "object": {} } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let (app, _state) = common::create_test_app();

    let payload = serde_json::json!({
        "type": "checkout.session.completed",
        "data": { "object": { "customer_email": "fogg@reform.club" } }
    })
    .to_string();
    let header_value = sign_webhook_payload("whsec_wrong", payload.as_bytes(), Utc::now().timestamp());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/webhook/stripe")
                .header(header::CONTENT_TYPE, "application/json")
                .header("stripe-signature", header_value)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signed_checkout_completion_activates_the_subscription() {
    let (app, _state) = common::create_test_app();

    let payload = serde_json::json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "customer_details": { "email": "fogg@reform.club" },
                "metadata": { "display_name": "Phileas" }
            }
        }
    })
    .to_string();
    // The test config's webhook secret
    let header_value = sign_webhook_payload("whsec_test", payload.as_bytes(), Utc::now().timestamp());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/webhook/stripe")
                .header(header::CONTENT_TYPE, "application/json")
                .header("stripe-signature", header_value)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Onboarding with the same email resumes the activated session
    let token = common::onboard(&app, "fogg@reform.club").await;
    let response = common::get(&app, "/api/me", Some(&token)).await;
    let body = common::read_json(response).await;
    assert_eq!(body["subscription"]["status"], "active");
}

#[tokio::test]
async fn test_webhook_ignores_other_event_types() {
    let (app, _state) = common::create_test_app();

    let payload = serde_json::json!({
        "type": "invoice.paid",
        "data": { "object": {} }
    })
    .to_string();
    let header_value = sign_webhook_payload("whsec_test", payload.as_bytes(), Utc::now().timestamp());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/webhook/stripe")
                .header(header::CONTENT_TYPE, "application/json")
                .header("stripe-signature", header_value)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
