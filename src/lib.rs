// SPDX-License-Identifier: MIT

//! Eighty Ways: backend API for "Around the World in 80 Ways".
//!
//! Users log physical activities, which convert into typed energy
//! reserves; reserves are deployed to advance a narrative journey and
//! community raid events.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use services::{BillingService, JourneyCatalog, RaidBoard};
use store::SessionManager;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionManager,
    pub catalog: JourneyCatalog,
    pub raids: Arc<RaidBoard>,
    pub billing: BillingService,
}
