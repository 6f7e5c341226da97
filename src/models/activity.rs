// SPDX-License-Identifier: MIT

//! Logged activity records and the activity classification table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::energy::EnergyKind;

/// Exertion level chosen when logging an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    Moderate,
    Vigorous,
}

impl Intensity {
    /// Energy multiplier applied to the duration term.
    pub fn multiplier(self) -> f64 {
        match self {
            Intensity::Light => 0.5,
            Intensity::Moderate => 1.0,
            Intensity::Vigorous => 1.5,
        }
    }
}

/// The sixteen recognized activity classifications, four per energy
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    // Nautical
    Rowing,
    Swimming,
    Sailing,
    Kayaking,
    // Terrestrial
    Running,
    Walking,
    Hiking,
    Jogging,
    // Transport
    Cycling,
    Skateboarding,
    Rollerblading,
    #[serde(rename = "E-biking")]
    EBiking,
    // Strength
    Weightlifting,
    CrossFit,
    Calisthenics,
    Yoga,
}

impl ActivityKind {
    /// The category this activity charges at full efficiency.
    pub fn natural_energy(self) -> EnergyKind {
        use ActivityKind::*;
        match self {
            Rowing | Swimming | Sailing | Kayaking => EnergyKind::Nautical,
            Running | Walking | Hiking | Jogging => EnergyKind::Terrestrial,
            Cycling | Skateboarding | Rollerblading | EBiking => EnergyKind::Transport,
            Weightlifting | CrossFit | Calisthenics | Yoga => EnergyKind::Strength,
        }
    }
}

/// Consumable applied while logging an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Booster {
    /// Doubles the computed actual energy
    EnergyAmplifier,
    /// Charges every reserve instead of only the target
    MultiCharge,
}

/// A logged activity. Immutable once stored; history is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
    /// Category the user chose to charge
    pub target: EnergyKind,
    /// Duration in minutes (1-600)
    pub duration_minutes: u32,
    /// Distance in kilometers, when the activity covers ground (or water)
    pub distance_km: Option<f64>,
    pub intensity: Intensity,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// Raw energy before the efficiency factor
    pub base_energy: f64,
    /// 1.0 on a natural-category match, 0.5 on a cross-charge
    pub efficiency: f64,
    /// Energy actually credited to the reserve(s)
    pub actual_energy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booster: Option<Booster>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_energy_covers_all_sixteen_kinds() {
        use ActivityKind::*;
        let expectations = [
            (Rowing, EnergyKind::Nautical),
            (Swimming, EnergyKind::Nautical),
            (Sailing, EnergyKind::Nautical),
            (Kayaking, EnergyKind::Nautical),
            (Running, EnergyKind::Terrestrial),
            (Walking, EnergyKind::Terrestrial),
            (Hiking, EnergyKind::Terrestrial),
            (Jogging, EnergyKind::Terrestrial),
            (Cycling, EnergyKind::Transport),
            (Skateboarding, EnergyKind::Transport),
            (Rollerblading, EnergyKind::Transport),
            (EBiking, EnergyKind::Transport),
            (Weightlifting, EnergyKind::Strength),
            (CrossFit, EnergyKind::Strength),
            (Calisthenics, EnergyKind::Strength),
            (Yoga, EnergyKind::Strength),
        ];
        for (kind, expected) in expectations {
            assert_eq!(kind.natural_energy(), expected);
        }
    }

    #[test]
    fn test_intensity_multipliers() {
        assert_eq!(Intensity::Light.multiplier(), 0.5);
        assert_eq!(Intensity::Moderate.multiplier(), 1.0);
        assert_eq!(Intensity::Vigorous.multiplier(), 1.5);
    }

    #[test]
    fn test_activity_kind_serde_labels() {
        let json = serde_json::to_string(&ActivityKind::EBiking).unwrap();
        assert_eq!(json, "\"E-biking\"");
        let back: ActivityKind = serde_json::from_str("\"CrossFit\"").unwrap();
        assert_eq!(back, ActivityKind::CrossFit);
    }
}
