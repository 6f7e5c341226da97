// SPDX-License-Identifier: MIT

//! Deployment allocation: turning offered reserves into leg progress.
//!
//! The allocator is the strict boundary for deployment amounts. Offers that
//! are negative, non-finite, or beyond the available balance are rejected
//! before any reserve is touched; the ledger's clamping below this layer is
//! a backstop, not a contract.

use serde::{Deserialize, Serialize};

use crate::models::energy::{EnergyKind, EnergyReserves};

/// Per-category amounts offered for deployment. Maps one-to-one onto the
/// deployment sliders.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EnergyOffers {
    #[serde(default)]
    pub nautical: f64,
    #[serde(default)]
    pub terrestrial: f64,
    #[serde(default)]
    pub transport: f64,
    #[serde(default)]
    pub strength: f64,
}

impl EnergyOffers {
    pub fn iter(&self) -> [(EnergyKind, f64); 4] {
        [
            (EnergyKind::Nautical, self.nautical),
            (EnergyKind::Terrestrial, self.terrestrial),
            (EnergyKind::Transport, self.transport),
            (EnergyKind::Strength, self.strength),
        ]
    }
}

/// One category's share of an allocation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AllocationLine {
    pub kind: EnergyKind,
    pub amount: f64,
    pub efficiency: f64,
    pub progress: f64,
}

/// The computed deployment, ready to apply.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Allocation {
    pub lines: Vec<AllocationLine>,
    pub total_deployed: f64,
    pub total_progress: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("{} amount must be a finite, non-negative number", kind.label())]
    InvalidAmount { kind: EnergyKind },

    #[error(
        "insufficient {} reserve: offered {offered:.2}, available {available:.2}",
        kind.label()
    )]
    InsufficientBalance {
        kind: EnergyKind,
        offered: f64,
        available: f64,
    },
}

/// Tolerance for slider values that sit exactly on the available balance,
/// covering sub-second decay between the read and the deploy.
const BALANCE_EPSILON: f64 = 1e-6;

/// Compute the efficiency-weighted progress for a set of offers against the
/// `target` category, checking every offer against the current reserves.
pub fn plan(
    offers: &EnergyOffers,
    reserves: &EnergyReserves,
    target: EnergyKind,
) -> Result<Allocation, AllocationError> {
    let mut allocation = Allocation::default();

    for (kind, amount) in offers.iter() {
        if amount == 0.0 {
            continue;
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(AllocationError::InvalidAmount { kind });
        }
        let available = reserves.get(kind).current;
        if amount > available + BALANCE_EPSILON {
            return Err(AllocationError::InsufficientBalance {
                kind,
                offered: amount,
                available,
            });
        }

        let efficiency = kind.deploy_efficiency(target);
        let progress = amount * efficiency;
        allocation.lines.push(AllocationLine {
            kind,
            amount,
            efficiency,
            progress,
        });
        allocation.total_deployed += amount;
        allocation.total_progress += progress;
    }

    Ok(allocation)
}
