// SPDX-License-Identifier: MIT

//! Raid board: listing and contributions.

use axum::http::StatusCode;

mod common;

async fn charge_nautical(app: &axum::Router, token: &str, minutes: u32) {
    let response = common::post_json(
        app,
        "/api/activities",
        Some(token),
        serde_json::json!({
            "kind": "Swimming",
            "target": "nautical",
            "duration_minutes": minutes,
            "intensity": "moderate"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_board_lists_the_schedule() {
    let (app, _state) = common::create_test_app();
    let token = common::onboard(&app, "fogg@reform.club").await;

    let response = common::get(&app, "/api/raids", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::read_json(response).await;
    let raids = body["raids"].as_array().unwrap();
    assert_eq!(raids.len(), 2);

    let active = raids.iter().find(|r| r["id"] == "typhoon-watch").unwrap();
    assert_eq!(active["status"], "active");
    assert_eq!(active["kind"], "nautical");
    assert_eq!(active["your_contribution"], 0.0);
}

#[tokio::test]
async fn test_contribution_spends_reserves_and_moves_the_board() {
    let (app, _state) = common::create_test_app();
    let token = common::onboard(&app, "fogg@reform.club").await;

    charge_nautical(&app, &token, 120).await; // 2.0 nautical

    let response = common::post_json(
        &app,
        "/api/raids/typhoon-watch/contribute",
        Some(&token),
        serde_json::json!({ "nautical": 2.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::read_json(response).await;
    assert_eq!(body["allocation"]["total_progress"], 2.0);
    assert_eq!(body["community_progress"], 2.0);
    assert_eq!(body["your_contribution"], 2.0);

    // The reserve was spent
    let response = common::get(&app, "/api/energy", Some(&token)).await;
    let body = common::read_json(response).await;
    assert!(body["reserves"]["nautical"]["current"].as_f64().unwrap() < 0.01);

    // And the board remembers across users
    let other = common::onboard(&app, "aouda@reform.club").await;
    let response = common::get(&app, "/api/raids", Some(&other)).await;
    let body = common::read_json(response).await;
    let raid = body["raids"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id"] == "typhoon-watch")
        .unwrap()
        .clone();
    assert_eq!(raid["current_progress"], 2.0);
    assert_eq!(raid["participant_count"], 1);
    assert_eq!(raid["your_contribution"], 0.0);
}

#[tokio::test]
async fn test_scheduled_raid_refuses_contributions() {
    let (app, _state) = common::create_test_app();
    let token = common::onboard(&app, "fogg@reform.club").await;

    charge_nautical(&app, &token, 60).await;

    let response = common::post_json(
        &app,
        "/api/raids/transcontinental-dash/contribute",
        Some(&token),
        serde_json::json!({ "nautical": 1.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_raid_is_not_found() {
    let (app, _state) = common::create_test_app();
    let token = common::onboard(&app, "fogg@reform.club").await;

    let response = common::post_json(
        &app,
        "/api/raids/kraken-hunt/contribute",
        Some(&token),
        serde_json::json!({ "nautical": 1.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contribution_beyond_balance_is_rejected() {
    let (app, _state) = common::create_test_app();
    let token = common::onboard(&app, "fogg@reform.club").await;

    charge_nautical(&app, &token, 60).await; // 1.0 nautical

    let response = common::post_json(
        &app,
        "/api/raids/typhoon-watch/contribute",
        Some(&token),
        serde_json::json!({ "nautical": 3.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
