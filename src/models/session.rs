// SPDX-License-Identifier: MIT

//! The serializable unit of persistence: one user's entire session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::activity::Activity;
use crate::models::energy::EnergyReserves;
use crate::models::journey::Journey;
use crate::models::user::UserProfile;

/// Everything the server holds for one user. Loaded through the store
/// adapter, mutated under the per-session lock, saved back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub user: UserProfile,
    pub reserves: EnergyReserves,
    /// Append-only activity history, newest first
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journey: Option<Journey>,
    /// Energy contributed per raid id
    #[serde(default)]
    pub raid_contributions: HashMap<String, f64>,
    /// While set and in the future, reserve decay is paused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decay_inhibited_until: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new(user: UserProfile, now: DateTime<Utc>) -> Self {
        Self {
            user,
            reserves: EnergyReserves::new(now),
            activities: Vec::new(),
            journey: None,
            raid_contributions: HashMap::new(),
            decay_inhibited_until: None,
        }
    }

    /// Bring reserves up to date: decay for the elapsed time, unless an
    /// inhibitor covers `now`, in which case only the clocks advance.
    pub fn sync_reserves(&mut self, now: DateTime<Utc>) {
        match self.decay_inhibited_until {
            Some(until) if now < until => self.reserves.touch(now),
            _ => {
                self.decay_inhibited_until = None;
                self.reserves.apply_decay(now);
            }
        }
    }
}
