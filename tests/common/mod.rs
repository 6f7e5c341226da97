// SPDX-License-Identifier: MIT

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

use eighty_ways::config::Config;
use eighty_ways::routes::create_router;
use eighty_ways::services::{BillingService, JourneyCatalog, RaidBoard};
use eighty_ways::store::{MemoryStore, SessionManager, SessionStore};
use eighty_ways::AppState;

/// Create a test app with an in-memory store and the built-in catalog.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    let config = Config::test_default();
    let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::new());
    let sessions = SessionManager::new(store);
    let catalog = JourneyCatalog::default();
    let raids = Arc::new(RaidBoard::seed(chrono::Utc::now()));

    let state = Arc::new(AppState {
        config,
        sessions,
        catalog,
        raids,
        billing: BillingService::new(),
    });

    (create_router(state.clone()), state)
}

/// Onboard a user and return their session token.
#[allow(dead_code)]
pub async fn onboard(app: &Router, email: &str) -> String {
    let response = post_json(
        app,
        "/auth/session",
        None,
        serde_json::json!({ "email": email }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    body["token"].as_str().expect("token in response").to_string()
}

/// Send a JSON POST, optionally authenticated.
#[allow(dead_code)]
pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Send a GET, optionally authenticated.
#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log a moderate run of `minutes` against the terrestrial reserve.
#[allow(dead_code)]
pub async fn log_run(app: &Router, token: &str, minutes: u32) -> Response<Body> {
    post_json(
        app,
        "/api/activities",
        Some(token),
        serde_json::json!({
            "kind": "Running",
            "target": "terrestrial",
            "duration_minutes": minutes,
            "intensity": "moderate"
        }),
    )
    .await
}
