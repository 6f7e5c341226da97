// SPDX-License-Identifier: MIT

//! User profile, subscription, consumable inventory, and the pre-computed
//! stats aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::activity::{Activity, Booster};

/// Subscription lifecycle, mirroring the billing provider's states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    Canceled,
    PastDue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub status: SubscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Fresh seven-day trial, started at `now`.
    pub fn trial(now: DateTime<Utc>) -> Self {
        Self {
            status: SubscriptionStatus::Trialing,
            trial_end: Some(now + chrono::Duration::days(7)),
            current_period_end: None,
        }
    }

    /// Whether the paywall lets this user through.
    pub fn entitled(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            SubscriptionStatus::Active => true,
            SubscriptionStatus::Trialing => self.trial_end.is_none_or(|end| now < end),
            SubscriptionStatus::Canceled | SubscriptionStatus::PastDue => false,
        }
    }
}

/// Consumable inventory. Credits buy boosters; boosters are consumed when
/// used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub energy_amplifier: u32,
    #[serde(default)]
    pub decay_inhibitor: u32,
    #[serde(default)]
    pub multi_charge: u32,
}

impl Inventory {
    /// Inventory granted to a brand-new session.
    pub fn starter() -> Self {
        Self {
            credits: 100,
            ..Self::default()
        }
    }

    /// Consume one booster unit. Returns `false` (without mutating) when
    /// none are held.
    pub fn consume(&mut self, booster: Booster) -> bool {
        let slot = match booster {
            Booster::EnergyAmplifier => &mut self.energy_amplifier,
            Booster::MultiCharge => &mut self.multi_charge,
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

/// Pre-computed per-user statistics, updated with every processed activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub total_activities: u32,
    #[serde(default)]
    pub total_distance_km: f64,
    #[serde(default)]
    pub total_energy_generated: f64,
    /// Consecutive days with at least one logged activity
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<NaiveDate>,
    #[serde(default)]
    pub journeys_completed: u32,
}

impl UserStats {
    /// Fold a freshly logged activity into the aggregate.
    pub fn update_from_activity(&mut self, activity: &Activity) {
        self.total_activities += 1;
        self.total_distance_km += activity.distance_km.unwrap_or(0.0);
        self.total_energy_generated += activity.actual_energy;

        let today = activity.timestamp.date_naive();
        self.current_streak = match self.last_activity_date {
            Some(last) if last == today => self.current_streak,
            Some(last) if today.signed_duration_since(last).num_days() == 1 => {
                self.current_streak + 1
            }
            _ => 1,
        };
        self.last_activity_date = Some(today);
    }
}

/// The session's user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub subscription: Subscription,
    pub stats: UserStats,
    pub inventory: Inventory,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Stable user id derived from the email, so re-onboarding with the
    /// same address resumes the same session.
    pub fn id_for_email(email: &str) -> Uuid {
        Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            email.trim().to_ascii_lowercase().as_bytes(),
        )
    }
}
