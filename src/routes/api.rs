// SPDX-License-Identifier: MIT

//! API routes for authenticated users: profile, activity log, shop.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::activity::{Activity, ActivityKind, Booster, Intensity};
use crate::models::energy::{EnergyKind, EnergyReserves};
use crate::models::user::{Inventory, Subscription, UserStats};
use crate::services::activity::log_activity;
use crate::services::converter::LogActivityRequest;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/activities", post(post_activity).get(get_activities))
        .route("/api/shop/purchase", post(purchase))
        .route("/api/shop/use-inhibitor", post(use_inhibitor))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub subscription: Subscription,
    pub stats: UserStats,
    pub inventory: Inventory,
    pub created_at: String,
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let response = state
        .sessions
        .with_session(user.user_id, |session| {
            Ok(MeResponse {
                user_id: session.user.id,
                email: session.user.email.clone(),
                display_name: session.user.display_name.clone(),
                subscription: session.user.subscription.clone(),
                stats: session.user.stats.clone(),
                inventory: session.user.inventory.clone(),
                created_at: format_utc_rfc3339(session.user.created_at),
            })
        })
        .await?;

    Ok(Json(response))
}

// ─── Activity Log ────────────────────────────────────────────

#[derive(Serialize)]
pub struct LogActivityResponse {
    pub activity: Activity,
    /// Reserve levels after the charge
    pub reserves: EnergyReserves,
}

/// Log an activity: convert it to energy and charge the chosen reserve.
async fn post_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<LogActivityRequest>,
) -> Result<Json<LogActivityResponse>> {
    let now = Utc::now();
    let response = state
        .sessions
        .with_session(user.user_id, |session| {
            let activity = log_activity(session, &request, now)?;
            Ok(LogActivityResponse {
                activity,
                reserves: session.reserves.clone(),
            })
        })
        .await?;

    Ok(Json(response))
}

// ─── Activity History ────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Only activities after this instant (RFC3339)
    after: Option<String>,
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

const MAX_PER_PAGE: u32 = 100;
const CURSOR_PARTS: usize = 3;

/// Position of the last item the client has seen, in newest-first order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HistoryCursor {
    timestamp: DateTime<Utc>,
    activity_id: Uuid,
}

fn parse_after_timestamp(after: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    after
        .map(|raw| {
            chrono::DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| {
                    crate::error::AppError::BadRequest(
                        "Invalid 'after' parameter: must be RFC3339 datetime".to_string(),
                    )
                })
        })
        .transpose()
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<HistoryCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || crate::error::AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let parts: Vec<&str> = decoded_str.split(':').collect();
            if parts.len() != CURSOR_PARTS {
                return Err(invalid_cursor());
            }

            let seconds = parts[0].parse::<i64>().map_err(|_| invalid_cursor())?;
            let nanos = parts[1].parse::<u32>().map_err(|_| invalid_cursor())?;
            let activity_id = parts[2].parse::<Uuid>().map_err(|_| invalid_cursor())?;
            let timestamp =
                chrono::DateTime::from_timestamp(seconds, nanos).ok_or_else(invalid_cursor)?;

            Ok(HistoryCursor {
                timestamp,
                activity_id,
            })
        })
        .transpose()
}

fn encode_cursor(cursor: HistoryCursor) -> String {
    let payload = format!(
        "{}:{}:{}",
        cursor.timestamp.timestamp(),
        cursor.timestamp.timestamp_subsec_nanos(),
        cursor.activity_id
    );
    URL_SAFE_NO_PAD.encode(payload)
}

/// True when `activity` comes strictly after the cursor position in
/// newest-first order.
fn past_cursor(activity: &Activity, cursor: &HistoryCursor) -> bool {
    activity.timestamp < cursor.timestamp
        || (activity.timestamp == cursor.timestamp
            && activity.id.as_u128() < cursor.activity_id.as_u128())
}

#[derive(Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivitySummary>,
    pub per_page: u32,
    /// Total returned; 0 when `next_cursor` is present, as the exact
    /// remainder is not counted.
    pub total: u32,
    pub next_cursor: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct ActivitySummary {
    pub id: Uuid,
    pub timestamp: String,
    pub kind: ActivityKind,
    pub target: EnergyKind,
    pub duration_minutes: u32,
    pub distance_km: Option<f64>,
    pub intensity: Intensity,
    pub actual_energy: f64,
    pub booster: Option<Booster>,
}

/// Get the user's activity history, newest first.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    let limit = params.per_page.clamp(1, MAX_PER_PAGE) as usize;
    let after = parse_after_timestamp(params.after.as_deref())?;
    let cursor = parse_cursor(params.cursor.as_deref())?;

    let mut page: Vec<Activity> = state
        .sessions
        .with_session(user.user_id, |session| {
            Ok(session
                .activities
                .iter()
                .filter(|a| after.is_none_or(|after| a.timestamp > after))
                .filter(|a| cursor.as_ref().is_none_or(|c| past_cursor(a, c)))
                .take(limit + 1)
                .cloned()
                .collect())
        })
        .await?;

    let has_more = page.len() > limit;
    if has_more {
        page.truncate(limit);
    }

    let next_cursor = if has_more {
        page.last().map(|a| {
            encode_cursor(HistoryCursor {
                timestamp: a.timestamp,
                activity_id: a.id,
            })
        })
    } else {
        None
    };

    let activities: Vec<ActivitySummary> = page
        .into_iter()
        .map(|a| ActivitySummary {
            id: a.id,
            timestamp: format_utc_rfc3339(a.timestamp),
            kind: a.kind,
            target: a.target,
            duration_minutes: a.duration_minutes,
            distance_km: a.distance_km,
            intensity: a.intensity,
            actual_energy: a.actual_energy,
            booster: a.booster,
        })
        .collect();

    let total = if next_cursor.is_some() {
        0
    } else {
        activities.len() as u32
    };

    Ok(Json(ActivitiesResponse {
        activities,
        per_page: limit as u32,
        total,
        next_cursor,
    }))
}

// ─── Shop ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopItem {
    EnergyAmplifier,
    DecayInhibitor,
    MultiCharge,
}

impl ShopItem {
    fn price(self) -> u32 {
        match self {
            ShopItem::EnergyAmplifier => 100,
            ShopItem::DecayInhibitor => 150,
            ShopItem::MultiCharge => 250,
        }
    }
}

#[derive(Deserialize)]
struct PurchaseRequest {
    item: ShopItem,
    #[serde(default = "default_quantity")]
    quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Serialize)]
pub struct InventoryResponse {
    pub inventory: Inventory,
}

/// Spend credits on consumables.
async fn purchase(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<InventoryResponse>> {
    if request.quantity == 0 || request.quantity > 10 {
        return Err(crate::error::AppError::BadRequest(
            "Quantity must be between 1 and 10".to_string(),
        ));
    }

    let inventory = state
        .sessions
        .with_session(user.user_id, |session| {
            let cost = request.item.price() * request.quantity;
            let inventory = &mut session.user.inventory;
            if inventory.credits < cost {
                return Err(crate::error::AppError::BadRequest(format!(
                    "Not enough credits: need {}, have {}",
                    cost, inventory.credits
                )));
            }
            inventory.credits -= cost;
            match request.item {
                ShopItem::EnergyAmplifier => inventory.energy_amplifier += request.quantity,
                ShopItem::DecayInhibitor => inventory.decay_inhibitor += request.quantity,
                ShopItem::MultiCharge => inventory.multi_charge += request.quantity,
            }
            Ok(inventory.clone())
        })
        .await?;

    Ok(Json(InventoryResponse { inventory }))
}

#[derive(Serialize)]
pub struct UseInhibitorResponse {
    pub decay_inhibited_until: String,
    pub inventory: Inventory,
}

/// Consume a decay inhibitor: reserves stop decaying for 24 hours.
async fn use_inhibitor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UseInhibitorResponse>> {
    let now = Utc::now();
    let response = state
        .sessions
        .with_session(user.user_id, |session| {
            if session.user.inventory.decay_inhibitor == 0 {
                return Err(crate::error::AppError::BadRequest(
                    "No decay inhibitor in inventory".to_string(),
                ));
            }
            // Decay up to now first, then pause from here
            session.sync_reserves(now);
            session.user.inventory.decay_inhibitor -= 1;

            let until = now + chrono::Duration::hours(24);
            let until = match session.decay_inhibited_until {
                Some(existing) if existing > until => existing,
                _ => until,
            };
            session.decay_inhibited_until = Some(until);

            Ok(UseInhibitorResponse {
                decay_inhibited_until: format_utc_rfc3339(until),
                inventory: session.user.inventory.clone(),
            })
        })
        .await?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip() {
        let cursor = HistoryCursor {
            timestamp: chrono::DateTime::from_timestamp(1_704_103_200, 123).unwrap(),
            activity_id: Uuid::new_v4(),
        };

        let encoded = encode_cursor(cursor);
        let decoded = parse_cursor(Some(&encoded)).unwrap().unwrap();

        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_cursor_rejects_invalid_input() {
        let err = parse_cursor(Some("not-base64!!")).unwrap_err();
        assert!(matches!(err, crate::error::AppError::BadRequest(_)));
    }

    #[test]
    fn test_after_rejects_non_rfc3339() {
        let err = parse_after_timestamp(Some("yesterday")).unwrap_err();
        assert!(matches!(err, crate::error::AppError::BadRequest(_)));
    }
}
