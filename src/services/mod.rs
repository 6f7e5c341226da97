// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod activity;
pub mod billing;
pub mod catalog;
pub mod converter;
pub mod deployment;
pub mod raids;

pub use billing::BillingService;
pub use catalog::JourneyCatalog;
pub use converter::{EnergyComputation, LogActivityRequest};
pub use deployment::{Allocation, EnergyOffers};
pub use raids::RaidBoard;
