// SPDX-License-Identifier: MIT

//! The raid board: community-wide progress on shared raid events.
//!
//! Events are a fixed schedule seeded at startup; progress is shared across
//! every session in this process, keyed by raid id.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::energy::EnergyKind;
use crate::models::raid::{RaidEvent, RaidStatus};

#[derive(Debug, Default)]
struct CommunityProgress {
    total_energy: f64,
    participants: HashSet<Uuid>,
}

/// A raid event as presented to one user.
#[derive(Debug, Clone, Serialize)]
pub struct RaidSummary {
    #[serde(flatten)]
    pub event: RaidEvent,
    pub status: RaidStatus,
    pub current_progress: f64,
    pub participant_count: u32,
    pub your_contribution: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum RaidError {
    #[error("Unknown raid: {0}")]
    Unknown(String),

    #[error("Raid is not active")]
    NotActive,
}

pub struct RaidBoard {
    events: Vec<RaidEvent>,
    progress: DashMap<String, CommunityProgress>,
}

impl RaidBoard {
    pub fn new(events: Vec<RaidEvent>) -> Self {
        Self {
            events,
            progress: DashMap::new(),
        }
    }

    /// The default schedule: one raid underway, one on the horizon.
    pub fn seed(now: DateTime<Utc>) -> Self {
        Self::new(vec![
            RaidEvent {
                id: "typhoon-watch".to_string(),
                name: "Typhoon Watch".to_string(),
                kind: EnergyKind::Nautical,
                starts_at: now - Duration::hours(12),
                ends_at: now + Duration::hours(60),
                goal_energy: 500.0,
                narrative: "A storm front closes on the fleet east of Hong Kong. \
                            Pool nautical energy to hold the crossing open."
                    .to_string(),
            },
            RaidEvent {
                id: "transcontinental-dash".to_string(),
                name: "Transcontinental Dash".to_string(),
                kind: EnergyKind::Transport,
                starts_at: now + Duration::days(7),
                ends_at: now + Duration::days(9),
                goal_energy: 750.0,
                narrative: "The express across the plains leaves in one week. \
                            Stockpile transport energy for the sprint."
                    .to_string(),
            },
        ])
    }

    pub fn event(&self, raid_id: &str) -> Option<&RaidEvent> {
        self.events.iter().find(|event| event.id == raid_id)
    }

    /// Record a contribution against an active raid. Returns the raid's new
    /// community total.
    pub fn contribute(
        &self,
        raid_id: &str,
        user_id: Uuid,
        energy: f64,
        now: DateTime<Utc>,
    ) -> Result<f64, RaidError> {
        let event = self
            .event(raid_id)
            .ok_or_else(|| RaidError::Unknown(raid_id.to_string()))?;
        if event.status(now) != RaidStatus::Active {
            return Err(RaidError::NotActive);
        }

        let mut entry = self.progress.entry(raid_id.to_string()).or_default();
        entry.total_energy += energy.max(0.0);
        entry.participants.insert(user_id);
        Ok(entry.total_energy)
    }

    /// Board view for one user, given their per-raid contribution tally.
    pub fn summaries(
        &self,
        contributions: &std::collections::HashMap<String, f64>,
        now: DateTime<Utc>,
    ) -> Vec<RaidSummary> {
        self.events
            .iter()
            .map(|event| {
                let (current_progress, participant_count) = self
                    .progress
                    .get(&event.id)
                    .map(|p| (p.total_energy, p.participants.len() as u32))
                    .unwrap_or((0.0, 0));
                RaidSummary {
                    event: event.clone(),
                    status: event.status(now),
                    current_progress,
                    participant_count,
                    your_contribution: contributions.get(&event.id).copied().unwrap_or(0.0),
                }
            })
            .collect()
    }
}
