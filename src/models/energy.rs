// SPDX-License-Identifier: MIT

//! Typed energy reserves and the deployment efficiency table.
//!
//! Every reserve obeys `0 <= current <= max` after any sequence of charge,
//! deploy, and decay operations. Decay is a pure function of elapsed time
//! since `last_updated`, so invocation cadence never affects the outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::hours_between;

/// Default reserve capacity.
pub const DEFAULT_MAX: f64 = 10.0;
/// Default proportional decay per day of inactivity.
pub const DEFAULT_DECAY_RATE_PER_DAY: f64 = 0.05;

/// The four energy categories. Closed enumeration: there is no such thing
/// as an unrecognized category key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyKind {
    Nautical,
    Terrestrial,
    Transport,
    Strength,
}

impl EnergyKind {
    pub const ALL: [EnergyKind; 4] = [
        EnergyKind::Nautical,
        EnergyKind::Terrestrial,
        EnergyKind::Transport,
        EnergyKind::Strength,
    ];

    /// Efficiency of deploying this kind of energy against a `target`
    /// requirement: full credit on a match, partial credit for related
    /// pairs, half credit otherwise. Strength is related to nothing.
    pub fn deploy_efficiency(self, target: EnergyKind) -> f64 {
        use EnergyKind::*;
        match (self, target) {
            (Nautical, Nautical)
            | (Terrestrial, Terrestrial)
            | (Transport, Transport)
            | (Strength, Strength) => 1.0,
            (Strength, _) | (_, Strength) => 0.5,
            (Nautical, Terrestrial)
            | (Terrestrial, Nautical)
            | (Nautical, Transport)
            | (Transport, Nautical)
            | (Terrestrial, Transport)
            | (Transport, Terrestrial) => 0.75,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EnergyKind::Nautical => "nautical",
            EnergyKind::Terrestrial => "terrestrial",
            EnergyKind::Transport => "transport",
            EnergyKind::Strength => "strength",
        }
    }
}

/// One typed reserve pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyReserve {
    /// Stored energy, always within `[0, max]`
    pub current: f64,
    /// Capacity
    pub max: f64,
    /// Proportional loss per day of inactivity
    pub decay_rate_per_day: f64,
    /// Instant of the last charge, deploy, or decay
    pub last_updated: DateTime<Utc>,
}

impl EnergyReserve {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current: 0.0,
            max: DEFAULT_MAX,
            decay_rate_per_day: DEFAULT_DECAY_RATE_PER_DAY,
            last_updated: now,
        }
    }

    /// Add energy, saturating at capacity. Non-positive or non-finite
    /// amounts are a no-op guard.
    pub fn charge(&mut self, amount: f64, now: DateTime<Utc>) {
        if amount.is_finite() && amount > 0.0 {
            self.current = (self.current + amount).min(self.max);
        }
        self.last_updated = now;
    }

    /// Remove energy, clamping at zero. The deployment allocator rejects
    /// over-requests before they reach here; the clamp is the backstop for
    /// the reserve invariant, not an error path.
    pub fn deploy(&mut self, amount: f64, now: DateTime<Utc>) {
        if amount.is_finite() && amount > 0.0 {
            self.current = (self.current - amount).max(0.0);
        }
        self.last_updated = now;
    }

    /// Apply proportional decay for the time elapsed since `last_updated`.
    ///
    /// Continuous form: `current *= exp(-rate * hours / 24)`. Splitting an
    /// interval across any number of calls yields exactly the same balance
    /// as a single call over the whole interval.
    pub fn apply_decay(&mut self, now: DateTime<Utc>) {
        let hours = hours_between(self.last_updated, now);
        if hours > 0.0 {
            let factor = (-self.decay_rate_per_day * hours / 24.0).exp();
            self.current = (self.current * factor).max(0.0);
        }
        self.last_updated = now;
    }

    /// Advance `last_updated` without decaying (decay inhibitor active).
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now;
    }
}

/// All four reserves, one field per kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyReserves {
    pub nautical: EnergyReserve,
    pub terrestrial: EnergyReserve,
    pub transport: EnergyReserve,
    pub strength: EnergyReserve,
}

impl EnergyReserves {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            nautical: EnergyReserve::new(now),
            terrestrial: EnergyReserve::new(now),
            transport: EnergyReserve::new(now),
            strength: EnergyReserve::new(now),
        }
    }

    pub fn get(&self, kind: EnergyKind) -> &EnergyReserve {
        match kind {
            EnergyKind::Nautical => &self.nautical,
            EnergyKind::Terrestrial => &self.terrestrial,
            EnergyKind::Transport => &self.transport,
            EnergyKind::Strength => &self.strength,
        }
    }

    pub fn get_mut(&mut self, kind: EnergyKind) -> &mut EnergyReserve {
        match kind {
            EnergyKind::Nautical => &mut self.nautical,
            EnergyKind::Terrestrial => &mut self.terrestrial,
            EnergyKind::Transport => &mut self.transport,
            EnergyKind::Strength => &mut self.strength,
        }
    }

    /// Decay every reserve up to `now`.
    pub fn apply_decay(&mut self, now: DateTime<Utc>) {
        for kind in EnergyKind::ALL {
            self.get_mut(kind).apply_decay(now);
        }
    }

    /// Advance every reserve's clock without decaying.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        for kind in EnergyKind::ALL {
            self.get_mut(kind).touch(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        "2026-01-15T10:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_self_match_is_always_optimal() {
        for kind in EnergyKind::ALL {
            assert_eq!(kind.deploy_efficiency(kind), 1.0);
        }
    }

    #[test]
    fn test_strength_is_unrelated_to_everything() {
        for other in [
            EnergyKind::Nautical,
            EnergyKind::Terrestrial,
            EnergyKind::Transport,
        ] {
            assert_eq!(EnergyKind::Strength.deploy_efficiency(other), 0.5);
            assert_eq!(other.deploy_efficiency(EnergyKind::Strength), 0.5);
        }
    }

    #[test]
    fn test_related_pairs_are_symmetric() {
        let pairs = [
            (EnergyKind::Nautical, EnergyKind::Terrestrial),
            (EnergyKind::Nautical, EnergyKind::Transport),
            (EnergyKind::Terrestrial, EnergyKind::Transport),
        ];
        for (a, b) in pairs {
            assert_eq!(a.deploy_efficiency(b), 0.75);
            assert_eq!(b.deploy_efficiency(a), 0.75);
        }
    }

    #[test]
    fn test_charge_saturates_at_capacity() {
        let mut reserve = EnergyReserve::new(t0());
        reserve.charge(7.0, t0());
        reserve.charge(6.0, t0());
        assert_eq!(reserve.current, DEFAULT_MAX);
    }

    #[test]
    fn test_negative_charge_is_a_no_op() {
        let mut reserve = EnergyReserve::new(t0());
        reserve.charge(3.0, t0());
        reserve.charge(-5.0, t0());
        assert_eq!(reserve.current, 3.0);
    }

    #[test]
    fn test_over_deploy_clamps_at_zero() {
        let mut reserve = EnergyReserve::new(t0());
        reserve.charge(2.0, t0());
        reserve.deploy(100.0, t0());
        assert_eq!(reserve.current, 0.0);
    }

    #[test]
    fn test_decay_is_additive_over_time() {
        let start = t0();
        let mut split = EnergyReserve::new(start);
        split.charge(8.0, start);
        let mut whole = split.clone();

        // One 12-hour step vs. two 6-hour steps
        whole.apply_decay(start + Duration::hours(12));
        split.apply_decay(start + Duration::hours(6));
        split.apply_decay(start + Duration::hours(12));

        assert!((whole.current - split.current).abs() < 1e-12);
    }

    #[test]
    fn test_decay_many_small_steps_match_one_large_step() {
        let start = t0();
        let mut fine = EnergyReserve::new(start);
        fine.charge(10.0, start);
        let mut coarse = fine.clone();

        for i in 1..=48 {
            fine.apply_decay(start + Duration::minutes(30 * i));
        }
        coarse.apply_decay(start + Duration::hours(24));

        assert!((fine.current - coarse.current).abs() < 1e-9);
    }

    #[test]
    fn test_decay_rate_is_roughly_five_percent_per_day() {
        let start = t0();
        let mut reserve = EnergyReserve::new(start);
        reserve.charge(10.0, start);
        reserve.apply_decay(start + Duration::hours(24));
        // exp(-0.05) ~= 0.9512
        assert!((reserve.current - 9.512).abs() < 0.01);
    }

    #[test]
    fn test_invariant_holds_under_mixed_operations() {
        let start = t0();
        let mut reserve = EnergyReserve::new(start);
        let steps: [(f64, f64, i64); 6] = [
            (4.0, 0.0, 1),
            (0.0, 2.5, 2),
            (20.0, 0.0, 5),
            (0.0, 50.0, 7),
            (3.0, 1.0, 30),
            (-2.0, -1.0, 31),
        ];
        for (charge, deploy, hour) in steps {
            let now = start + Duration::hours(hour);
            reserve.apply_decay(now);
            reserve.charge(charge, now);
            reserve.deploy(deploy, now);
            assert!(reserve.current >= 0.0, "floor violated");
            assert!(reserve.current <= reserve.max, "cap violated");
        }
    }

    #[test]
    fn test_touch_skips_decay_but_advances_clock() {
        let start = t0();
        let mut reserve = EnergyReserve::new(start);
        reserve.charge(5.0, start);
        let later = start + Duration::hours(24);
        reserve.touch(later);
        assert_eq!(reserve.current, 5.0);
        assert_eq!(reserve.last_updated, later);
    }
}
