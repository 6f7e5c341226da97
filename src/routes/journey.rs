// SPDX-License-Identifier: MIT

//! Journey, energy, and raid routes.
//!
//! Deployment is the only path that moves a journey forward: reserves are
//! decayed to the present, the allocator validates and weights the offer,
//! the ledger deducts it, and the tracker advances — all inside the
//! session's critical section.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::energy::EnergyReserves;
use crate::models::journey::{Challenge, Journey, JourneyStatus};
use crate::models::session::SessionState;
use crate::services::deployment::{self, Allocation, EnergyOffers};
use crate::services::raids::RaidSummary;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/journey", get(get_journey))
        .route("/api/journey/start", post(start_journey))
        .route("/api/energy", get(get_energy))
        .route("/api/energy/deploy", post(deploy_energy))
        .route("/api/raids", get(get_raids))
        .route("/api/raids/{raid_id}/contribute", post(contribute_to_raid))
}

/// Paywall check shared by the progression endpoints.
fn ensure_entitled(session: &SessionState, now: DateTime<Utc>) -> Result<()> {
    if session.user.subscription.entitled(now) {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "An active subscription is required".to_string(),
        ))
    }
}

// ─── Journey ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct JourneyResponse {
    pub journey: Option<Journey>,
}

/// Get the session's journey, if one has been started.
async fn get_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<JourneyResponse>> {
    let journey = state
        .sessions
        .with_session(user.user_id, |session| Ok(session.journey.clone()))
        .await?;
    Ok(Json(JourneyResponse { journey }))
}

/// Start the catalog journey: first leg active, the rest locked.
async fn start_journey(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Journey>> {
    let now = Utc::now();
    let catalog = state.catalog.clone();

    let journey = state
        .sessions
        .with_session(user.user_id, move |session| {
            ensure_entitled(session, now)?;
            if session
                .journey
                .as_ref()
                .is_some_and(|j| j.status == JourneyStatus::InProgress)
            {
                return Err(AppError::BadRequest(
                    "A journey is already in progress".to_string(),
                ));
            }

            let journey = catalog.instantiate(now);
            tracing::info!(
                user_id = %session.user.id,
                journey_id = %journey.id,
                legs = journey.legs.len(),
                "Journey started"
            );
            session.journey = Some(journey.clone());
            Ok(journey)
        })
        .await?;

    Ok(Json(journey))
}

// ─── Energy ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EnergyResponse {
    pub reserves: EnergyReserves,
    pub decay_inhibited_until: Option<String>,
}

/// Reserve snapshot. Decay is applied on read, so the numbers are current
/// no matter how long the session sat idle.
async fn get_energy(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<EnergyResponse>> {
    let now = Utc::now();
    let response = state
        .sessions
        .with_session(user.user_id, |session| {
            session.sync_reserves(now);
            Ok(EnergyResponse {
                reserves: session.reserves.clone(),
                decay_inhibited_until: session.decay_inhibited_until.map(format_utc_rfc3339),
            })
        })
        .await?;
    Ok(Json(response))
}

#[derive(Serialize)]
pub struct DeployResponse {
    pub allocation: Allocation,
    pub challenge: Option<Challenge>,
    pub leg_completed: bool,
    pub journey_complete: bool,
    pub current_day: u32,
}

/// Deploy reserves against the active leg's requirement.
async fn deploy_energy(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(offers): Json<EnergyOffers>,
) -> Result<Json<DeployResponse>> {
    let now = Utc::now();
    let response = state
        .sessions
        .with_session(user.user_id, |session| {
            ensure_entitled(session, now)?;

            let target = session
                .journey
                .as_ref()
                .filter(|j| j.status == JourneyStatus::InProgress)
                .and_then(|j| j.challenge.as_ref())
                .map(|challenge| challenge.required_energy.kind)
                .ok_or_else(|| AppError::BadRequest("No journey in progress".to_string()))?;

            session.sync_reserves(now);

            let allocation = deployment::plan(&offers, &session.reserves, target)
                .map_err(|err| AppError::BadRequest(err.to_string()))?;
            if allocation.total_deployed == 0.0 {
                return Err(AppError::BadRequest("No energy offered".to_string()));
            }

            for line in &allocation.lines {
                session.reserves.get_mut(line.kind).deploy(line.amount, now);
            }

            let Some(journey) = session.journey.as_mut() else {
                return Err(AppError::BadRequest("No journey in progress".to_string()));
            };
            let outcome = journey.apply_progress(allocation.total_progress, now);
            if outcome.journey_complete {
                session.user.stats.journeys_completed += 1;
            }

            tracing::info!(
                user_id = %session.user.id,
                deployed = allocation.total_deployed,
                progress = allocation.total_progress,
                leg_completed = outcome.leg_completed,
                journey_complete = outcome.journey_complete,
                "Energy deployed"
            );

            Ok(DeployResponse {
                challenge: journey.challenge.clone(),
                current_day: journey.current_day,
                leg_completed: outcome.leg_completed,
                journey_complete: outcome.journey_complete,
                allocation,
            })
        })
        .await?;

    Ok(Json(response))
}

// ─── Raids ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RaidsResponse {
    pub raids: Vec<RaidSummary>,
}

/// The raid board, with this user's contributions folded in.
async fn get_raids(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RaidsResponse>> {
    let now = Utc::now();
    let contributions = state
        .sessions
        .with_session(user.user_id, |session| Ok(session.raid_contributions.clone()))
        .await?;
    Ok(Json(RaidsResponse {
        raids: state.raids.summaries(&contributions, now),
    }))
}

#[derive(Serialize)]
pub struct ContributeResponse {
    pub allocation: Allocation,
    pub community_progress: f64,
    pub your_contribution: f64,
}

/// Deploy reserves into an active raid.
async fn contribute_to_raid(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(raid_id): Path<String>,
    Json(offers): Json<EnergyOffers>,
) -> Result<Json<ContributeResponse>> {
    let now = Utc::now();
    let raid_kind = state
        .raids
        .event(&raid_id)
        .ok_or_else(|| AppError::NotFound(format!("Raid {} not found", raid_id)))?
        .kind;

    let board = state.raids.clone();
    let response = state
        .sessions
        .with_session(user.user_id, move |session| {
            ensure_entitled(session, now)?;
            session.sync_reserves(now);

            let allocation = deployment::plan(&offers, &session.reserves, raid_kind)
                .map_err(|err| AppError::BadRequest(err.to_string()))?;
            if allocation.total_deployed == 0.0 {
                return Err(AppError::BadRequest("No energy offered".to_string()));
            }

            // Validates the raid is active before any reserve is touched
            let community_progress = board
                .contribute(&raid_id, session.user.id, allocation.total_progress, now)
                .map_err(|err| AppError::BadRequest(err.to_string()))?;

            for line in &allocation.lines {
                session.reserves.get_mut(line.kind).deploy(line.amount, now);
            }

            let tally = session
                .raid_contributions
                .entry(raid_id.clone())
                .or_insert(0.0);
            *tally += allocation.total_progress;

            Ok(ContributeResponse {
                your_contribution: *tally,
                community_progress,
                allocation,
            })
        })
        .await?;

    Ok(Json(response))
}
