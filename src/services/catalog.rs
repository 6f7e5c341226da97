// SPDX-License-Identifier: MIT

//! Journey catalog: the route every session's journey is instantiated from.
//!
//! Loaded from `data/journey_legs.json` at startup. The built-in default
//! route keeps tests and local development independent of the data file.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::energy::EnergyKind;
use crate::models::journey::{Journey, JourneyLeg, LegNarrative, LegStatus, RequiredEnergy};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog contains no legs")]
    Empty,
}

/// On-disk leg description.
#[derive(Debug, Clone, Deserialize)]
struct CatalogLeg {
    leg_number: u32,
    from: String,
    to: String,
    distance_km: f64,
    required_energy: RequiredEnergy,
    narrative: LegNarrative,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    legs: Vec<CatalogLeg>,
}

/// The loaded route. Leg ids are minted at load time and shared by every
/// journey instantiated from this catalog.
#[derive(Debug, Clone)]
pub struct JourneyCatalog {
    legs: Vec<JourneyLeg>,
}

impl JourneyCatalog {
    pub fn load_from_file(path: &str) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&raw)?;
        Self::from_legs(file.legs)
    }

    fn from_legs(mut legs: Vec<CatalogLeg>) -> Result<Self, CatalogError> {
        if legs.is_empty() {
            return Err(CatalogError::Empty);
        }
        legs.sort_by_key(|leg| leg.leg_number);
        let legs = legs
            .into_iter()
            .map(|leg| JourneyLeg {
                id: Uuid::new_v4(),
                leg_number: leg.leg_number,
                from: leg.from,
                to: leg.to,
                distance_km: leg.distance_km,
                required_energy: leg.required_energy,
                narrative: leg.narrative,
                progress: 0.0,
                status: LegStatus::Locked,
                started_at: None,
                completed_at: None,
            })
            .collect();
        Ok(Self { legs })
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Total route distance, for progress displays.
    pub fn total_distance_km(&self) -> f64 {
        self.legs.iter().map(|leg| leg.distance_km).sum()
    }

    /// Build a fresh journey over this route.
    pub fn instantiate(&self, now: DateTime<Utc>) -> Journey {
        Journey::start(self.legs.clone(), now)
    }
}

impl Default for JourneyCatalog {
    /// A short built-in route, used by tests and as a fallback route shape.
    fn default() -> Self {
        fn leg(
            number: u32,
            from: &str,
            to: &str,
            distance_km: f64,
            kind: EnergyKind,
            amount: f64,
        ) -> CatalogLeg {
            CatalogLeg {
                leg_number: number,
                from: from.to_string(),
                to: to.to_string(),
                distance_km,
                required_energy: RequiredEnergy { kind, amount },
                narrative: LegNarrative {
                    title: format!("{} to {}", from, to),
                    description: String::new(),
                    departure_quote: String::new(),
                    arrival_quote: String::new(),
                },
            }
        }

        let legs = vec![
            leg(1, "London", "Paris", 344.0, EnergyKind::Terrestrial, 3.0),
            leg(2, "Paris", "Marseille", 775.0, EnergyKind::Transport, 5.0),
            leg(3, "Marseille", "Suez", 2700.0, EnergyKind::Nautical, 8.0),
            leg(4, "Suez", "Bombay", 4600.0, EnergyKind::Strength, 6.0),
        ];
        Self::from_legs(legs).expect("built-in route is non-empty")
    }
}
