//! Ball identity, regime and per-frame motion state.
//!
//! Regime codes follow the native solver so shot files can carry them as
//! plain integers.

use std::fmt;

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::physics_constants::ball;
use crate::error::CoreError;

// ============================================================================
// Ball number
// ============================================================================

/// Ball number, 0 (cue) through 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BallNumber(u8);

impl BallNumber {
    pub const CUE: BallNumber = BallNumber(0);
    pub const EIGHT: BallNumber = BallNumber(8);

    pub fn new(number: u8) -> Option<Self> {
        (number <= ball::MAX_NUMBER).then_some(Self(number))
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Slot in fixed-size per-ball tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_cue(self) -> bool {
        self.0 == 0
    }

    /// Every ball number, cue first.
    pub fn all() -> impl Iterator<Item = BallNumber> {
        (0..=ball::MAX_NUMBER).map(BallNumber)
    }

    pub fn appearance(self) -> BallAppearance {
        let striped = self.0 > 8;
        let base = if striped { self.0 - 8 } else { self.0 };
        BallAppearance { color: BALL_COLORS[base as usize], striped }
    }
}

impl TryFrom<u8> for BallNumber {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        BallNumber::new(value).ok_or(CoreError::InvalidBallNumber(value))
    }
}

impl From<BallNumber> for u8 {
    fn from(value: BallNumber) -> Self {
        value.0
    }
}

impl fmt::Display for BallNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cue() {
            write!(f, "cue")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

// ============================================================================
// Appearance
// ============================================================================

/// Solid colours indexed by ball number; stripes reuse `number - 8`.
pub const BALL_COLORS: [(u8, u8, u8); 9] = [
    (227, 228, 230), // White
    (234, 220, 93),  // Yellow
    (56, 121, 171),  // Blue
    (219, 72, 65),   // Red
    (137, 133, 171), // Purple
    (230, 140, 72),  // Orange
    (75, 133, 88),   // Green
    (165, 67, 67),   // Dark red
    (32, 30, 31),    // Black
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallAppearance {
    pub color: (u8, u8, u8),
    pub striped: bool,
}

// ============================================================================
// Regime
// ============================================================================

/// Frictional contact mode of a ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BallRegime {
    NotInPlay,
    #[default]
    Stationary,
    Spinning,
    Sliding,
    Rolling,
    PocketedSw,
    PocketedW,
    PocketedNw,
    PocketedNe,
    PocketedE,
    PocketedSe,
}

impl BallRegime {
    pub fn code(self) -> u8 {
        match self {
            BallRegime::NotInPlay => 0,
            BallRegime::Stationary => 1,
            BallRegime::Spinning => 2,
            BallRegime::Sliding => 3,
            BallRegime::Rolling => 4,
            BallRegime::PocketedSw => 5,
            BallRegime::PocketedW => 6,
            BallRegime::PocketedNw => 7,
            BallRegime::PocketedNe => 8,
            BallRegime::PocketedE => 9,
            BallRegime::PocketedSe => 10,
        }
    }

    pub fn is_pocketed(self) -> bool {
        matches!(
            self,
            BallRegime::PocketedSw
                | BallRegime::PocketedW
                | BallRegime::PocketedNw
                | BallRegime::PocketedNe
                | BallRegime::PocketedE
                | BallRegime::PocketedSe
        )
    }

    /// Whether the ball is drawn at all.
    pub fn is_visible(self) -> bool {
        !(self == BallRegime::NotInPlay || self.is_pocketed())
    }

    pub fn is_in_motion(self) -> bool {
        matches!(self, BallRegime::Spinning | BallRegime::Sliding | BallRegime::Rolling)
    }
}

impl TryFrom<u8> for BallRegime {
    type Error = CoreError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => BallRegime::NotInPlay,
            1 => BallRegime::Stationary,
            2 => BallRegime::Spinning,
            3 => BallRegime::Sliding,
            4 => BallRegime::Rolling,
            5 => BallRegime::PocketedSw,
            6 => BallRegime::PocketedW,
            7 => BallRegime::PocketedNw,
            8 => BallRegime::PocketedNe,
            9 => BallRegime::PocketedE,
            10 => BallRegime::PocketedSe,
            other => return Err(CoreError::InvalidRegime(other)),
        })
    }
}

impl From<BallRegime> for u8 {
    fn from(regime: BallRegime) -> Self {
        regime.code()
    }
}

impl fmt::Display for BallRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BallRegime::NotInPlay => "NotInPlay",
            BallRegime::Stationary => "Stationary",
            BallRegime::Spinning => "Spinning",
            BallRegime::Sliding => "Sliding",
            BallRegime::Rolling => "Rolling",
            BallRegime::PocketedSw => "Pocketed(SW)",
            BallRegime::PocketedW => "Pocketed(W)",
            BallRegime::PocketedNw => "Pocketed(NW)",
            BallRegime::PocketedNe => "Pocketed(NE)",
            BallRegime::PocketedE => "Pocketed(E)",
            BallRegime::PocketedSe => "Pocketed(SE)",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Motion state
// ============================================================================

/// Position, velocity and spin of one ball at one instant.
///
/// `velocity.z` is the solver's vertical channel and is carried through
/// untouched; all friction acts in the table plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallMotionState {
    pub position: Vector2<f64>,
    pub velocity: Vector3<f64>,
    pub spin: Vector3<f64>,
    pub regime: BallRegime,
}

impl BallMotionState {
    pub fn at_rest(position: Vector2<f64>) -> Self {
        Self::placed(position, BallRegime::Stationary)
    }

    /// Ball with no motion in the given regime (stationary, pocketed, off table).
    pub fn placed(position: Vector2<f64>, regime: BallRegime) -> Self {
        Self { position, velocity: Vector3::zeros(), spin: Vector3::zeros(), regime }
    }

    /// Planar speed.
    pub fn speed(&self) -> f64 {
        self.velocity.xy().norm()
    }
}

impl Default for BallMotionState {
    fn default() -> Self {
        Self::at_rest(Vector2::zeros())
    }
}

/// A ball on the table: identity, size and current motion.
#[derive(Debug, Clone, PartialEq)]
pub struct GameBall {
    pub number: BallNumber,
    pub radius: f64,
    pub state: BallMotionState,
}

impl GameBall {
    pub fn new(number: BallNumber, radius: f64, state: BallMotionState) -> Self {
        Self { number, radius, state }
    }

    pub fn appearance(&self) -> BallAppearance {
        self.number.appearance()
    }

    /// Hit test in table-surface coordinates.
    pub fn contains(&self, point: Vector2<f64>) -> bool {
        (self.state.position - point).norm() < self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_number_range() {
        assert!(BallNumber::new(0).is_some());
        assert!(BallNumber::new(15).is_some());
        assert!(BallNumber::new(16).is_none());
        assert_eq!(BallNumber::all().count(), ball::COUNT);
    }

    #[test]
    fn test_stripes_reuse_solid_colours() {
        let three = BallNumber::new(3).unwrap().appearance();
        let eleven = BallNumber::new(11).unwrap().appearance();
        assert_eq!(three.color, eleven.color);
        assert!(!three.striped);
        assert!(eleven.striped);
        assert!(!BallNumber::EIGHT.appearance().striped);
    }

    #[test]
    fn test_regime_codes_round_trip() {
        for code in 0..=10u8 {
            let regime = BallRegime::try_from(code).unwrap();
            assert_eq!(regime.code(), code);
        }
        assert!(matches!(BallRegime::try_from(11), Err(CoreError::InvalidRegime(11))));
    }

    #[test]
    fn test_regime_visibility() {
        assert!(BallRegime::Rolling.is_visible());
        assert!(BallRegime::Stationary.is_visible());
        assert!(!BallRegime::NotInPlay.is_visible());
        assert!(!BallRegime::PocketedNe.is_visible());
        assert!(BallRegime::Spinning.is_in_motion());
        assert!(!BallRegime::Stationary.is_in_motion());
    }

    #[test]
    fn test_regime_deserializes_from_code() {
        let regime: BallRegime = serde_json::from_str("4").unwrap();
        assert_eq!(regime, BallRegime::Rolling);
        assert!(serde_json::from_str::<BallRegime>("42").is_err());
    }

    #[test]
    fn test_ball_contains_point() {
        let ball = GameBall::new(
            BallNumber::CUE,
            ball::RADIUS_M,
            BallMotionState::at_rest(Vector2::new(0.5, 0.5)),
        );
        assert!(ball.contains(Vector2::new(0.51, 0.5)));
        assert!(!ball.contains(Vector2::new(0.6, 0.5)));
    }
}
