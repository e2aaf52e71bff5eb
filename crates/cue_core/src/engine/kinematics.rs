//! Closed-form ball kinematics under cloth friction.
//!
//! ## Regimes
//! ```text
//! Sliding  ──(u = 0)──▶ Rolling ──(v = 0)──▶ Spinning ──(ω_z = 0)──▶ Stationary
//!    │                                           ▲
//!    └──────────────(v = 0, ω_z ≠ 0)─────────────┘
//! ```
//!
//! `u = v + R·(ẑ × ω)` is the velocity of the cloth contact point. While it is
//! non-zero the ball slides and friction acts along `-û`; once it vanishes the
//! ball rolls and only rolling resistance acts along `-v̂`.
//!
//! Every function here is stateless. Both the timeline reconstructor and the
//! free-running stepper go through these helpers so the two paths share one
//! friction model.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::physics_constants::{ball, friction, tolerance};

/// Friction and geometry constants a shot is replayed with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionParams {
    pub mu_sliding: f64,
    pub mu_rolling: f64,
    pub mu_spinning: f64,
    pub gravity: f64,
    pub ball_radius: f64,
}

impl Default for FrictionParams {
    fn default() -> Self {
        Self {
            mu_sliding: friction::MU_SLIDING,
            mu_rolling: friction::MU_ROLLING,
            mu_spinning: friction::MU_SPINNING,
            gravity: friction::GRAVITY_MPS2,
            ball_radius: ball::RADIUS_M,
        }
    }
}

impl FrictionParams {
    #[inline]
    pub fn sliding_decel(&self) -> f64 {
        self.mu_sliding * self.gravity
    }

    #[inline]
    pub fn rolling_decel(&self) -> f64 {
        self.mu_rolling * self.gravity
    }

    /// Vertical spin deceleration (rad/s²) outside of sliding.
    #[inline]
    pub fn spin_decel(&self) -> f64 {
        5.0 * self.mu_spinning * self.gravity / (2.0 * self.ball_radius)
    }
}

/// Change produced by one closed-form regime update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDelta {
    pub displacement: Vector2<f64>,
    pub velocity: Vector3<f64>,
    pub spin: Vector3<f64>,
}

impl MotionDelta {
    fn hold(velocity: &Vector3<f64>, spin: &Vector3<f64>) -> Self {
        Self { displacement: Vector2::zeros(), velocity: *velocity, spin: *spin }
    }
}

// ============================================================================
// Numeric helpers
// ============================================================================

#[inline]
pub fn is_negligible(magnitude: f64) -> bool {
    magnitude.abs() < tolerance::VELOCITY_EPSILON
}

#[inline]
pub fn snap_to_zero(value: f64) -> f64 {
    if value.abs() < tolerance::EPSILON {
        0.0
    } else {
        value
    }
}

pub fn snap_vector(v: &Vector3<f64>) -> Vector3<f64> {
    v.map(snap_to_zero)
}

/// Unit vector along `v`, or `None` when `v` is too small to normalise.
pub fn direction(v: &Vector2<f64>) -> Option<Vector2<f64>> {
    let magnitude = v.norm();
    if is_negligible(magnitude) {
        None
    } else {
        Some(v / magnitude)
    }
}

/// Contact-point velocity induced by spin: `R·(ẑ × ω)`.
pub fn surface_velocity(spin: &Vector3<f64>, radius: f64) -> Vector3<f64> {
    Vector3::<f64>::z().cross(spin) * radius
}

/// Velocity of the cloth contact point: `v + R·(ẑ × ω)`.
pub fn relative_velocity(velocity: &Vector3<f64>, spin: &Vector3<f64>, radius: f64) -> Vector3<f64> {
    velocity + surface_velocity(spin, radius)
}

/// Rotate about the vertical axis by the angle whose cosine/sine are given.
pub fn rotate_about_z(v: &Vector3<f64>, cos_phi: f64, sin_phi: f64) -> Vector3<f64> {
    Vector3::new(v.x * cos_phi - v.y * sin_phi, v.x * sin_phi + v.y * cos_phi, v.z)
}

pub fn rotate_point(p: &Vector2<f64>, cos_phi: f64, sin_phi: f64) -> Vector2<f64> {
    Vector2::new(p.x * cos_phi - p.y * sin_phi, p.x * sin_phi + p.y * cos_phi)
}

/// Constant deceleration along `dir`: `(v·t − ½·a·t²·dir, v − a·t·dir)`.
pub fn decelerate(
    velocity: &Vector2<f64>,
    dir: &Vector2<f64>,
    decel: f64,
    dt: f64,
) -> (Vector2<f64>, Vector2<f64>) {
    let displacement = velocity * dt - dir * (0.5 * decel * dt * dt);
    let new_velocity = velocity - dir * (decel * dt);
    (displacement, new_velocity)
}

// ============================================================================
// Regime updates
// ============================================================================

/// Vertical spin after `dt` of spinning friction.
///
/// Decays linearly toward zero and stops there; a quarter rate applies while
/// the ball is still sliding.
pub fn spin_decay(w_z: f64, dt: f64, params: &FrictionParams, sliding: bool) -> f64 {
    if w_z.abs() < tolerance::EPSILON {
        return 0.0;
    }
    let scale = if sliding { friction::SLIDING_SPIN_DECAY_SCALE } else { 1.0 };
    let new_w_z = w_z - w_z.signum() * params.spin_decel() * dt * scale;
    if new_w_z * w_z <= 0.0 {
        0.0
    } else {
        new_w_z
    }
}

/// Time for a rolling ball at `speed` to come to rest.
pub fn rolling_stop_time(speed: f64, params: &FrictionParams) -> f64 {
    let decel = params.rolling_decel();
    if decel <= 0.0 {
        f64::INFINITY
    } else {
        speed / decel
    }
}

/// Time for a sliding ball to reach the rolling condition `u = 0`.
pub fn sliding_end_time(velocity: &Vector3<f64>, spin: &Vector3<f64>, params: &FrictionParams) -> f64 {
    let slip = relative_velocity(velocity, spin, params.ball_radius).xy().norm();
    let decel = params.sliding_decel();
    if decel <= 0.0 {
        f64::INFINITY
    } else {
        2.0 * slip / (7.0 * decel)
    }
}

/// Rolling update. Velocity decays along its own direction and never
/// reverses: past the stop time position holds and planar velocity is zero.
/// Horizontal spin scales with speed to keep the no-slip condition.
///
/// Returns a zero displacement when the ball has no planar velocity.
pub fn roll(
    velocity: &Vector3<f64>,
    spin: &Vector3<f64>,
    dt: f64,
    params: &FrictionParams,
) -> MotionDelta {
    let planar = velocity.xy();
    let Some(dir) = direction(&planar) else {
        return MotionDelta::hold(velocity, spin);
    };

    let speed = planar.norm();
    let stop_time = rolling_stop_time(speed, params);
    let t = dt.min(stop_time);
    let (displacement, mut new_planar) = decelerate(&planar, &dir, params.rolling_decel(), t);
    if dt >= stop_time {
        new_planar = Vector2::zeros();
    }

    let ratio = new_planar.norm() / speed;
    let mut new_spin = spin * ratio;
    new_spin.z = spin_decay(spin.z, dt, params, false);

    MotionDelta {
        displacement,
        velocity: Vector3::new(new_planar.x, new_planar.y, velocity.z),
        spin: new_spin,
    }
}

/// Sliding update. Friction acts along the contact-point velocity `û`, not
/// along `v`, and torques the ball toward rolling.
///
/// Returns a zero displacement when `u` is negligible.
pub fn slide(
    velocity: &Vector3<f64>,
    spin: &Vector3<f64>,
    dt: f64,
    params: &FrictionParams,
) -> MotionDelta {
    let slip = relative_velocity(velocity, spin, params.ball_radius).xy();
    let Some(dir) = direction(&slip) else {
        return MotionDelta::hold(velocity, spin);
    };

    let decel = params.sliding_decel();
    let (displacement, new_planar) = decelerate(&velocity.xy(), &dir, decel, dt);

    let dir3 = Vector3::new(dir.x, dir.y, 0.0);
    let torque_axis = dir3.cross(&Vector3::<f64>::z());
    let mut new_spin = spin + torque_axis * (-(5.0 * decel) / (2.0 * params.ball_radius) * dt);
    new_spin.z = spin_decay(spin.z, dt, params, true);

    MotionDelta {
        displacement,
        velocity: Vector3::new(new_planar.x, new_planar.y, velocity.z),
        spin: new_spin,
    }
}

/// Spinning update: the ball stays put, only vertical spin decays.
pub fn spin_in_place(spin: &Vector3<f64>, dt: f64, params: &FrictionParams) -> Vector3<f64> {
    Vector3::new(0.0, 0.0, spin_decay(spin.z, dt, params, false))
}
