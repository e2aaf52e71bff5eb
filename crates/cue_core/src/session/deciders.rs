//! Shot deciders: where the next stroke comes from.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::engine::table::Table;
use crate::models::shot::ShotParams;

/// Chooses the next stroke for a table, or `None` when the game is over.
pub trait ShotDecider {
    fn decide(&mut self, table: &Table) -> Option<ShotParams>;
}

impl<F> ShotDecider for F
where
    F: FnMut(&Table) -> Option<ShotParams>,
{
    fn decide(&mut self, table: &Table) -> Option<ShotParams> {
        self(table)
    }
}

/// Plays back a fixed list of strokes, then stops.
#[derive(Debug, Clone, Default)]
pub struct ShotListDecider {
    shots: VecDeque<ShotParams>,
}

impl ShotListDecider {
    pub fn new(shots: impl IntoIterator<Item = ShotParams>) -> Self {
        Self { shots: shots.into_iter().collect() }
    }

    pub fn remaining(&self) -> usize {
        self.shots.len()
    }
}

impl ShotDecider for ShotListDecider {
    fn decide(&mut self, _table: &Table) -> Option<ShotParams> {
        self.shots.pop_front()
    }
}

/// Same stroke every time; never ends a game on its own.
#[derive(Debug, Clone, Copy)]
pub struct FixedShotDecider {
    pub params: ShotParams,
}

impl FixedShotDecider {
    pub fn new(params: ShotParams) -> Self {
        Self { params }
    }

    /// Straight up the table, moderate pace.
    pub fn north() -> Self {
        Self::new(ShotParams::new(1.5, 0.0, 0.0, 11.0, 270.0))
    }

    /// Diagonal toward a corner pocket.
    pub fn hole() -> Self {
        Self::new(ShotParams::new(1.0, 0.0, 0.0, 11.0, 45.0))
    }
}

impl ShotDecider for FixedShotDecider {
    fn decide(&mut self, _table: &Table) -> Option<ShotParams> {
        Some(self.params)
    }
}

/// Roughly north: azimuth drawn uniformly from 260..280 degrees, otherwise
/// the same stroke as [`FixedShotDecider::north`].
#[derive(Debug, Clone)]
pub struct BiasedNorthDecider<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl BiasedNorthDecider<ChaCha8Rng> {
    /// Reproducible decider for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> BiasedNorthDecider<R> {
    pub const PHI_MIN: f64 = 260.0;
    pub const PHI_SPREAD: f64 = 20.0;

    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> ShotDecider for BiasedNorthDecider<R> {
    fn decide(&mut self, _table: &Table) -> Option<ShotParams> {
        let phi = Self::PHI_MIN + self.rng.gen::<f64>() * Self::PHI_SPREAD;
        Some(ShotParams { phi, ..FixedShotDecider::north().params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::TableConfig;

    #[test]
    fn test_list_decider_runs_out() {
        let table = Table::new(TableConfig::default());
        let mut decider = ShotListDecider::new([FixedShotDecider::north().params, FixedShotDecider::hole().params]);
        assert_eq!(decider.decide(&table).map(|p| p.phi), Some(270.0));
        assert_eq!(decider.decide(&table).map(|p| p.phi), Some(45.0));
        assert!(decider.decide(&table).is_none());
        assert_eq!(decider.remaining(), 0);
    }

    #[test]
    fn test_fixed_decider_never_ends() {
        let table = Table::new(TableConfig::default());
        let mut decider = FixedShotDecider::north();
        for _ in 0..3 {
            let p = decider.decide(&table).unwrap();
            assert_eq!((p.v, p.theta, p.phi), (1.5, 11.0, 270.0));
        }
    }

    #[test]
    fn test_closure_decider() {
        let table = Table::new(TableConfig::default());
        let mut calls = 0;
        let mut decider = |_: &Table| {
            calls += 1;
            (calls < 2).then(|| FixedShotDecider::north().params)
        };
        assert!(ShotDecider::decide(&mut decider, &table).is_some());
        assert!(ShotDecider::decide(&mut decider, &table).is_none());
    }

    #[test]
    fn test_biased_north_stays_in_band() {
        let table = Table::new(TableConfig::default());
        let mut decider = BiasedNorthDecider::seeded(7);
        let mut phis = Vec::new();
        for _ in 0..200 {
            let p = decider.decide(&table).unwrap();
            assert!((260.0..280.0).contains(&p.phi), "phi={}", p.phi);
            assert_eq!((p.v, p.a, p.b, p.theta), (1.5, 0.0, 0.0, 11.0));
            phis.push(p.phi);
        }
        assert!(phis.iter().any(|&phi| phi < 270.0));
        assert!(phis.iter().any(|&phi| phi > 270.0));
    }

    #[test]
    fn test_biased_north_is_reproducible() {
        let table = Table::new(TableConfig::default());
        let mut a = BiasedNorthDecider::seeded(42);
        let mut b = BiasedNorthDecider::seeded(42);
        for _ in 0..5 {
            assert_eq!(a.decide(&table), b.decide(&table));
        }
    }
}
