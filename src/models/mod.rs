// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod activity;
pub mod energy;
pub mod journey;
pub mod raid;
pub mod session;
pub mod user;

pub use activity::{Activity, ActivityKind, Booster, Intensity};
pub use energy::{EnergyKind, EnergyReserve, EnergyReserves};
pub use journey::{Challenge, Journey, JourneyLeg, JourneyStatus, LegStatus, RequiredEnergy};
pub use raid::{RaidEvent, RaidStatus};
pub use session::SessionState;
pub use user::{Inventory, Subscription, SubscriptionStatus, UserProfile, UserStats};
