// SPDX-License-Identifier: MIT

//! Activity-to-energy conversion.
//!
//! `convert` is a pure computation; all side effects (reserve charge,
//! inventory decrement, stats update) belong to the caller. Validation is
//! declared on the request type and surfaces per field.

use serde::Deserialize;
use validator::Validate;

use crate::models::activity::{ActivityKind, Booster, Intensity};
use crate::models::energy::EnergyKind;

/// Distance bonus per kilometer covered.
const DISTANCE_BONUS_PER_KM: f64 = 0.1;

/// Request body for logging an activity.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogActivityRequest {
    pub kind: ActivityKind,
    /// Category to charge; a cross-category choice halves the yield
    #[validate(required(message = "Target energy category is required"))]
    pub target: Option<EnergyKind>,
    #[validate(range(
        min = 1,
        max = 600,
        message = "Duration must be between 1 and 600 minutes"
    ))]
    pub duration_minutes: u32,
    #[validate(range(exclusive_min = 0.0, message = "Distance must be positive"))]
    #[serde(default)]
    pub distance_km: Option<f64>,
    pub intensity: Intensity,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub booster: Option<Booster>,
}

/// Result of converting one activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyComputation {
    pub base_energy: f64,
    pub efficiency: f64,
    pub actual_energy: f64,
}

/// Convert a logged activity into energy.
///
/// `base = minutes/60 * intensity + distance * 0.1`; charging outside the
/// activity's natural category costs half the yield; an amplifier doubles
/// the final amount.
pub fn convert(
    kind: ActivityKind,
    target: EnergyKind,
    duration_minutes: u32,
    distance_km: Option<f64>,
    intensity: Intensity,
    amplified: bool,
) -> EnergyComputation {
    let base_energy = (duration_minutes as f64 / 60.0) * intensity.multiplier()
        + distance_km.unwrap_or(0.0) * DISTANCE_BONUS_PER_KM;

    let efficiency = if target == kind.natural_energy() {
        1.0
    } else {
        0.5
    };

    let boost = if amplified { 2.0 } else { 1.0 };

    EnergyComputation {
        base_energy,
        efficiency,
        actual_energy: base_energy * efficiency * boost,
    }
}
