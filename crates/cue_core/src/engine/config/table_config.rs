//! Table geometry and cloth friction

use serde::{Deserialize, Serialize};

use crate::engine::kinematics::FrictionParams;
use crate::engine::physics_constants::{ball, friction, table};
use crate::error::{CoreError, Result};

/// Physical table the shots were solved on. Read-only for the lifetime of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Play surface width, short side (m)
    pub width: f64,
    /// Play surface length, long side (m)
    pub length: f64,
    pub side_pocket_width: f64,
    pub corner_pocket_width: f64,
    pub ball_radius: f64,

    pub mu_sliding: f64,
    pub mu_rolling: f64,
    pub mu_spinning: f64,
    pub gravity: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            width: table::WIDTH_M,
            length: table::LENGTH_M,
            side_pocket_width: table::SIDE_POCKET_WIDTH_M,
            corner_pocket_width: table::CORNER_POCKET_WIDTH_M,
            ball_radius: ball::RADIUS_M,

            mu_sliding: friction::MU_SLIDING,
            mu_rolling: friction::MU_ROLLING,
            mu_spinning: friction::MU_SPINNING,
            gravity: friction::GRAVITY_MPS2,
        }
    }
}

impl TableConfig {
    pub fn friction(&self) -> FrictionParams {
        FrictionParams {
            mu_sliding: self.mu_sliding,
            mu_rolling: self.mu_rolling,
            mu_spinning: self.mu_spinning,
            gravity: self.gravity,
            ball_radius: self.ball_radius,
        }
    }

    /// Same play surface, ignoring cloth and pockets.
    pub fn same_dimensions(&self, other: &TableConfig) -> bool {
        self.width == other.width && self.length == other.length
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("width", self.width),
            ("length", self.length),
            ("side_pocket_width", self.side_pocket_width),
            ("corner_pocket_width", self.corner_pocket_width),
            ("ball_radius", self.ball_radius),
            ("gravity", self.gravity),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(CoreError::InvalidParameter(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("mu_sliding", self.mu_sliding),
            ("mu_rolling", self.mu_rolling),
            ("mu_spinning", self.mu_spinning),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(CoreError::InvalidParameter(format!("{name} must be >= 0, got {value}")));
            }
        }
        Ok(())
    }
}
