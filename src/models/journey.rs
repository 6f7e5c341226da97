// SPDX-License-Identifier: MIT

//! Journey legs and the progress state machine.
//!
//! Legs move one way through `Locked -> Active -> Completed`. While a
//! journey is in progress exactly one leg is active; every leg before it is
//! completed and every leg after it is locked. Completing the final leg
//! moves the journey itself into the terminal `Complete` state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::energy::EnergyKind;

/// Typed energy requirement of a leg.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RequiredEnergy {
    pub kind: EnergyKind,
    pub amount: f64,
}

/// Flavor text attached to a leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegNarrative {
    pub title: String,
    pub description: String,
    pub departure_quote: String,
    pub arrival_quote: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegStatus {
    Locked,
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyLeg {
    pub id: Uuid,
    pub leg_number: u32,
    pub from: String,
    pub to: String,
    pub distance_km: f64,
    pub required_energy: RequiredEnergy,
    pub narrative: LegNarrative,
    /// Accumulated progress, clamped to `[0, required_energy.amount]`
    pub progress: f64,
    pub status: LegStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Transient view of the active leg's requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub leg_id: Uuid,
    pub required_energy: RequiredEnergy,
    pub current_progress: f64,
    pub deployments_count: u32,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    InProgress,
    /// Terminal: the final leg has been completed
    Complete,
}

/// What a progress update did to the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressOutcome {
    pub leg_completed: bool,
    pub journey_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    pub id: Uuid,
    pub legs: Vec<JourneyLeg>,
    /// Index of the active leg (or one past the end once complete)
    pub current_leg: usize,
    /// Narrative day counter; advances when a leg completes
    pub current_day: u32,
    pub status: JourneyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<Challenge>,
    pub started_at: DateTime<Utc>,
}

impl Journey {
    /// Start a journey over the given legs: first leg active, the rest
    /// locked. Legs must be non-empty and ordered by `leg_number`.
    pub fn start(mut legs: Vec<JourneyLeg>, now: DateTime<Utc>) -> Self {
        for (i, leg) in legs.iter_mut().enumerate() {
            leg.progress = 0.0;
            leg.started_at = None;
            leg.completed_at = None;
            leg.status = if i == 0 {
                LegStatus::Active
            } else {
                LegStatus::Locked
            };
        }
        if let Some(first) = legs.first_mut() {
            first.started_at = Some(now);
        }
        let challenge = legs.first().map(|leg| Challenge {
            leg_id: leg.id,
            required_energy: leg.required_energy,
            current_progress: 0.0,
            deployments_count: 0,
            started_at: now,
        });
        Self {
            id: Uuid::new_v4(),
            legs,
            current_leg: 0,
            current_day: 1,
            status: JourneyStatus::InProgress,
            challenge,
            started_at: now,
        }
    }

    pub fn active_leg(&self) -> Option<&JourneyLeg> {
        match self.status {
            JourneyStatus::InProgress => self.legs.get(self.current_leg),
            JourneyStatus::Complete => None,
        }
    }

    /// Record one deployment's worth of progress against the active leg.
    ///
    /// If the accumulated progress reaches the requirement, the leg
    /// completes and the next leg unlocks in the same update; completing
    /// the final leg retires the journey.
    pub fn apply_progress(&mut self, added: f64, now: DateTime<Utc>) -> ProgressOutcome {
        let mut outcome = ProgressOutcome {
            leg_completed: false,
            journey_complete: false,
        };
        if self.status == JourneyStatus::Complete || !added.is_finite() || added < 0.0 {
            return outcome;
        }
        let Some(leg) = self.legs.get_mut(self.current_leg) else {
            return outcome;
        };

        let required = leg.required_energy.amount;
        leg.progress = (leg.progress + added).min(required);

        if let Some(challenge) = self.challenge.as_mut() {
            challenge.current_progress = leg.progress;
            challenge.deployments_count += 1;
        }

        if leg.progress >= required {
            leg.status = LegStatus::Completed;
            leg.completed_at = Some(now);
            outcome.leg_completed = true;
            self.current_leg += 1;
            self.current_day += 1;

            if let Some(next) = self.legs.get_mut(self.current_leg) {
                next.status = LegStatus::Active;
                next.started_at = Some(now);
                self.challenge = Some(Challenge {
                    leg_id: next.id,
                    required_energy: next.required_energy,
                    current_progress: 0.0,
                    deployments_count: 0,
                    started_at: now,
                });
            } else {
                self.status = JourneyStatus::Complete;
                self.challenge = None;
                outcome.journey_complete = true;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(number: u32, kind: EnergyKind, amount: f64) -> JourneyLeg {
        JourneyLeg {
            id: Uuid::new_v4(),
            leg_number: number,
            from: format!("Stop {}", number),
            to: format!("Stop {}", number + 1),
            distance_km: 100.0,
            required_energy: RequiredEnergy { kind, amount },
            narrative: LegNarrative {
                title: format!("Leg {}", number),
                description: String::new(),
                departure_quote: String::new(),
                arrival_quote: String::new(),
            },
            progress: 0.0,
            status: LegStatus::Locked,
            started_at: None,
            completed_at: None,
        }
    }

    fn now() -> DateTime<Utc> {
        "2026-02-01T08:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_start_activates_only_the_first_leg() {
        let journey = Journey::start(
            vec![
                leg(1, EnergyKind::Terrestrial, 3.0),
                leg(2, EnergyKind::Nautical, 5.0),
            ],
            now(),
        );
        assert_eq!(journey.legs[0].status, LegStatus::Active);
        assert_eq!(journey.legs[1].status, LegStatus::Locked);
        assert_eq!(journey.current_day, 1);
        let challenge = journey.challenge.as_ref().unwrap();
        assert_eq!(challenge.leg_id, journey.legs[0].id);
        assert_eq!(challenge.current_progress, 0.0);
    }

    #[test]
    fn test_exact_requirement_completes_and_unlocks_in_one_update() {
        let mut journey = Journey::start(
            vec![
                leg(1, EnergyKind::Terrestrial, 3.0),
                leg(2, EnergyKind::Nautical, 5.0),
            ],
            now(),
        );
        journey.apply_progress(1.5, now());
        let outcome = journey.apply_progress(1.5, now());

        assert!(outcome.leg_completed);
        assert!(!outcome.journey_complete);
        assert_eq!(journey.legs[0].status, LegStatus::Completed);
        assert_eq!(journey.legs[1].status, LegStatus::Active);
        assert_eq!(journey.current_leg, 1);
        assert_eq!(journey.current_day, 2);
        assert_eq!(
            journey.challenge.as_ref().unwrap().leg_id,
            journey.legs[1].id
        );
    }

    #[test]
    fn test_progress_never_regresses_a_completed_leg() {
        let mut journey = Journey::start(
            vec![
                leg(1, EnergyKind::Terrestrial, 2.0),
                leg(2, EnergyKind::Nautical, 5.0),
            ],
            now(),
        );
        journey.apply_progress(2.0, now());
        journey.apply_progress(1.0, now());
        assert_eq!(journey.legs[0].status, LegStatus::Completed);
        assert_eq!(journey.legs[0].progress, 2.0);
        assert_eq!(journey.legs[1].progress, 1.0);
    }

    #[test]
    fn test_final_leg_completion_is_terminal() {
        let mut journey = Journey::start(vec![leg(1, EnergyKind::Strength, 1.0)], now());
        let outcome = journey.apply_progress(1.0, now());

        assert!(outcome.leg_completed);
        assert!(outcome.journey_complete);
        assert_eq!(journey.status, JourneyStatus::Complete);
        assert!(journey.challenge.is_none());
        assert!(journey.active_leg().is_none());

        // Further updates are ignored
        let after = journey.apply_progress(5.0, now());
        assert!(!after.leg_completed);
    }

    #[test]
    fn test_negative_progress_is_ignored() {
        let mut journey = Journey::start(vec![leg(1, EnergyKind::Transport, 4.0)], now());
        journey.apply_progress(-2.0, now());
        assert_eq!(journey.legs[0].progress, 0.0);
        assert_eq!(journey.challenge.as_ref().unwrap().deployments_count, 0);
    }

    #[test]
    fn test_challenge_counts_deployments() {
        let mut journey = Journey::start(vec![leg(1, EnergyKind::Transport, 10.0)], now());
        journey.apply_progress(1.0, now());
        journey.apply_progress(2.0, now());
        let challenge = journey.challenge.as_ref().unwrap();
        assert_eq!(challenge.deployments_count, 2);
        assert_eq!(challenge.current_progress, 3.0);
    }
}
