// SPDX-License-Identifier: MIT

//! Community raid events: time-boxed shared energy goals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::energy::EnergyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaidStatus {
    Scheduled,
    Active,
    Completed,
}

/// A raid event. The schedule is static; community progress lives on the
/// shared raid board and per-user contributions in each session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaidEvent {
    pub id: String,
    pub name: String,
    /// Energy category the raid calls for
    pub kind: EnergyKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Community-wide energy target
    pub goal_energy: f64,
    pub narrative: String,
}

impl RaidEvent {
    pub fn status(&self, now: DateTime<Utc>) -> RaidStatus {
        if now < self.starts_at {
            RaidStatus::Scheduled
        } else if now < self.ends_at {
            RaidStatus::Active
        } else {
            RaidStatus::Completed
        }
    }
}
