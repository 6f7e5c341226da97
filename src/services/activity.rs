// SPDX-License-Identifier: MIT

//! Activity logging workflow.
//!
//! Handles the core sequence for one logged activity:
//! 1. Validate the request (per-field)
//! 2. Bring reserves up to date (decay)
//! 3. Consume the booster, if one was applied
//! 4. Convert the activity into energy and charge the reserve(s)
//! 5. Append the immutable history record
//! 6. Fold the activity into the stats aggregate
//!
//! The whole sequence runs inside the caller's per-session critical
//! section, so it is atomic from the user's perspective.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::activity::{Activity, Booster};
use crate::models::energy::EnergyKind;
use crate::models::session::SessionState;
use crate::services::converter::{self, LogActivityRequest};

/// Log one activity against a session.
pub fn log_activity(
    state: &mut SessionState,
    request: &LogActivityRequest,
    now: DateTime<Utc>,
) -> Result<Activity> {
    request.validate()?;
    let target = request
        .target
        .ok_or_else(|| AppError::BadRequest("Target energy category is required".to_string()))?;

    state.sync_reserves(now);

    // Boosters are consumed up front; a failed consume leaves the session
    // untouched apart from the decay sync.
    if let Some(booster) = request.booster {
        if !state.user.inventory.consume(booster) {
            return Err(AppError::BadRequest(format!(
                "No {} in inventory",
                booster_label(booster)
            )));
        }
    }

    let amplified = request.booster == Some(Booster::EnergyAmplifier);
    let computed = converter::convert(
        request.kind,
        target,
        request.duration_minutes,
        request.distance_km,
        request.intensity,
        amplified,
    );

    match request.booster {
        Some(Booster::MultiCharge) => {
            for kind in EnergyKind::ALL {
                state.reserves.get_mut(kind).charge(computed.actual_energy, now);
            }
        }
        _ => {
            state
                .reserves
                .get_mut(target)
                .charge(computed.actual_energy, now);
        }
    }

    let activity = Activity {
        id: Uuid::new_v4(),
        timestamp: now,
        kind: request.kind,
        target,
        duration_minutes: request.duration_minutes,
        distance_km: request.distance_km,
        intensity: request.intensity,
        notes: request.notes.clone(),
        base_energy: computed.base_energy,
        efficiency: computed.efficiency,
        actual_energy: computed.actual_energy,
        booster: request.booster,
    };

    state.activities.insert(0, activity.clone());
    state.user.stats.update_from_activity(&activity);

    tracing::info!(
        user_id = %state.user.id,
        activity_id = %activity.id,
        kind = ?activity.kind,
        target = target.label(),
        actual_energy = activity.actual_energy,
        "Activity logged"
    );

    Ok(activity)
}

fn booster_label(booster: Booster) -> &'static str {
    match booster {
        Booster::EnergyAmplifier => "energy amplifier",
        Booster::MultiCharge => "multi-charge",
    }
}
