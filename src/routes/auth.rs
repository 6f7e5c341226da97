// SPDX-License-Identifier: MIT

//! Session creation and logout.
//!
//! There is no password flow: onboarding hands us an email, we derive a
//! stable user id from it and issue a session JWT. Re-onboarding with the
//! same address resumes the same session state.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::session::SessionState;
use crate::models::user::{Inventory, Subscription, UserProfile, UserStats};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/session", post(create_session))
        .route("/auth/logout", get(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default, alias = "displayName")]
    #[validate(length(max = 80, message = "Display name must be at most 80 characters"))]
    pub display_name: Option<String>,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub token: String,
    /// True when this request created the session (vs. resumed it)
    pub created: bool,
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    request.validate()?;

    let email = request.email.trim().to_ascii_lowercase();
    let user_id = UserProfile::id_for_email(&email);
    let now = Utc::now();

    let display_name = request
        .display_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or("Traveler").to_string());

    let profile = UserProfile {
        id: user_id,
        email,
        display_name,
        subscription: Subscription::trial(now),
        stats: UserStats::default(),
        inventory: Inventory::starter(),
        created_at: now,
    };

    let created = match state.sessions.create(SessionState::new(profile, now)).await {
        Ok(()) => true,
        // Existing session: resume it untouched
        Err(AppError::BadRequest(_)) => false,
        Err(err) => return Err(err),
    };

    if created {
        tracing::info!(user_id = %user_id, "Session created");
    }

    let token = create_jwt(user_id, &state.config.jwt_signing_key)?;
    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(SessionResponse {
            user_id,
            token,
            created,
        }),
    ))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(LogoutResponse { success: true }))
}
