//! Physics constants for shot replay
//!
//! Defaults match the standard pool table the native solver is configured
//! with. Anything a shot needs at runtime is read from `TableConfig`; these
//! are only the seeds for its `Default`.

// ============================================================
// Ball
// ============================================================
pub mod ball {
    /// Regulation pool ball radius (m), 2.25 in diameter
    pub const RADIUS_M: f64 = 0.028575;

    /// Cue ball plus object balls one to fifteen
    pub const COUNT: usize = 16;

    /// Highest object ball number
    pub const MAX_NUMBER: u8 = 15;
}

// ============================================================
// Friction model
// ============================================================
pub mod friction {
    /// Cloth sliding friction coefficient
    pub const MU_SLIDING: f64 = 0.2;

    /// Cloth rolling resistance coefficient
    pub const MU_ROLLING: f64 = 0.015;

    /// Spinning (vertical axis) friction coefficient
    pub const MU_SPINNING: f64 = 0.044;

    /// Gravitational acceleration (m/s²)
    pub const GRAVITY_MPS2: f64 = 9.81;

    /// Vertical spin decays at a quarter rate while the ball is still sliding
    pub const SLIDING_SPIN_DECAY_SCALE: f64 = 0.25;
}

// ============================================================
// Table surface
// ============================================================
pub mod table {
    /// Play surface width (m), short side
    pub const WIDTH_M: f64 = 1.1684;

    /// Play surface length (m), long side
    pub const LENGTH_M: f64 = 2.3368;

    /// Side pocket mouth (m)
    pub const SIDE_POCKET_WIDTH_M: f64 = 0.14;

    /// Corner pocket mouth (m)
    pub const CORNER_POCKET_WIDTH_M: f64 = 0.11;

    /// Wood border as a fraction of surface width
    pub const WOOD_FRACTION: f64 = 1.0 / 10.0;

    /// Cushion rail as a fraction of surface width
    pub const RAIL_FRACTION: f64 = 1.0 / 30.0;

    /// Head and foot spots as fractions of surface length
    pub const HEAD_SPOT_FRACTION: f64 = 0.25;
    pub const FOOT_SPOT_FRACTION: f64 = 0.75;

    /// Clearance between racked balls (m)
    pub const RACK_GAP_M: f64 = 1.0e-4;
}

// ============================================================
// Numeric tolerances
// ============================================================
pub mod tolerance {
    /// Post-step component snap threshold
    pub const EPSILON: f64 = 1.0e-11;

    /// Magnitudes below this count as zero (normalisation guard, regime checks)
    pub const VELOCITY_EPSILON: f64 = 1.0e-10;
}

// ============================================================
// Playback
// ============================================================
pub mod playback {
    /// Default render tick rate
    pub const DEFAULT_FPS: u32 = 60;

    /// Wall-clock time multiplier
    pub const DEFAULT_SPEED_FACTOR: f64 = 1.0;

    /// Slowest / fastest accepted speed factor
    pub const MIN_SPEED_FACTOR: f64 = 0.05;
    pub const MAX_SPEED_FACTOR: f64 = 20.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_aspect_ratio_is_two_to_one() {
        assert!((table::LENGTH_M / table::WIDTH_M - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_tolerances_ordered() {
        assert!(tolerance::EPSILON < tolerance::VELOCITY_EPSILON);
    }

    #[test]
    fn test_speed_bounds_contain_default() {
        assert!(playback::MIN_SPEED_FACTOR <= playback::DEFAULT_SPEED_FACTOR);
        assert!(playback::DEFAULT_SPEED_FACTOR <= playback::MAX_SPEED_FACTOR);
    }
}
