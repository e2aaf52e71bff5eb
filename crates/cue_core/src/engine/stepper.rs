//! Free-running friction stepper.
//!
//! Advances a single ball by a fixed `dt` without solver events, for when a
//! shot has no precomputed timeline (previews, manual nudges). Collisions are
//! not handled; the ball only decelerates through its regimes until at rest.
//!
//! Each step works in a frame aligned with the current velocity, applies the
//! regime's closed-form update from [`kinematics`], rotates back, snaps
//! numerical dust to zero and re-derives the regime.

use nalgebra::Vector2;

use super::ball::{BallMotionState, BallRegime};
use super::kinematics::{
    self, direction, is_negligible, relative_velocity, rotate_about_z, rotate_point, snap_vector,
    FrictionParams, MotionDelta,
};

/// Sliding -> rolling -> spinning -> stationary, plus one spare.
const MAX_TRANSITIONS_PER_STEP: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct FrictionStepper {
    params: FrictionParams,
}

impl FrictionStepper {
    pub fn new(params: FrictionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &FrictionParams {
        &self.params
    }

    /// State after `dt` seconds. Balls that are not spinning, sliding or
    /// rolling are returned as-is.
    ///
    /// A step that crosses a regime transition is split at the transition
    /// time and finished under the re-derived regime, so a sliding ball
    /// lands on the no-slip condition instead of oscillating around it.
    pub fn step(&self, state: &BallMotionState, dt: f64) -> BallMotionState {
        let mut current = *state;
        let mut remaining = dt;
        for _ in 0..MAX_TRANSITIONS_PER_STEP {
            if !current.regime.is_in_motion() {
                break;
            }
            let t = remaining.min(self.regime_end_time(&current));
            current = self.advance(&current, t);
            remaining -= t;
            if remaining <= 0.0 {
                break;
            }
        }
        current
    }

    /// Time until the current regime ends on its own.
    pub fn regime_end_time(&self, state: &BallMotionState) -> f64 {
        match state.regime {
            BallRegime::Sliding => kinematics::sliding_end_time(&state.velocity, &state.spin, &self.params),
            BallRegime::Rolling => kinematics::rolling_stop_time(state.speed(), &self.params),
            BallRegime::Spinning => {
                let decel = self.params.spin_decel();
                if decel <= 0.0 {
                    f64::INFINITY
                } else {
                    state.spin.z.abs() / decel
                }
            }
            _ => 0.0,
        }
    }

    /// One closed-form update in the current regime, then regime re-derivation.
    fn advance(&self, state: &BallMotionState, dt: f64) -> BallMotionState {
        let (cos_phi, sin_phi) = match direction(&state.velocity.xy()) {
            Some(dir) => (dir.x, dir.y),
            None => (1.0, 0.0),
        };
        let v = rotate_about_z(&state.velocity, cos_phi, -sin_phi);
        let w = rotate_about_z(&state.spin, cos_phi, -sin_phi);

        let delta = match state.regime {
            BallRegime::Sliding => kinematics::slide(&v, &w, dt, &self.params),
            BallRegime::Rolling => kinematics::roll(&v, &w, dt, &self.params),
            _ => MotionDelta {
                displacement: Vector2::zeros(),
                velocity: v,
                spin: kinematics::spin_in_place(&w, dt, &self.params),
            },
        };

        let next = BallMotionState {
            position: state.position + rotate_point(&delta.displacement, cos_phi, sin_phi),
            velocity: snap_vector(&rotate_about_z(&delta.velocity, cos_phi, sin_phi)),
            spin: snap_vector(&rotate_about_z(&delta.spin, cos_phi, sin_phi)),
            regime: state.regime,
        };

        log::trace!(
            "step {} {:.4}s -> ({:.4}, {:.4}) v=({:.4}, {:.4})",
            state.regime,
            dt,
            next.position.x,
            next.position.y,
            next.velocity.x,
            next.velocity.y
        );

        derive_regime(&next, self.params.ball_radius)
    }

    /// Step repeatedly until the ball stops moving or `max_steps` is reached.
    /// The returned trajectory starts with `state` itself.
    pub fn run(&self, state: &BallMotionState, dt: f64, max_steps: usize) -> Vec<BallMotionState> {
        let mut trajectory = Vec::with_capacity(max_steps.min(4096) + 1);
        let mut current = *state;
        trajectory.push(current);
        for _ in 0..max_steps {
            if !current.regime.is_in_motion() {
                break;
            }
            current = self.step(&current, dt);
            trajectory.push(current);
        }
        trajectory
    }
}

/// Regime implied by velocity and spin.
///
/// - moving with slip: Sliding
/// - moving without slip: Rolling
/// - not moving, vertical spin left: Spinning (horizontal spin cleared)
/// - otherwise: Stationary (velocity and spin cleared)
pub fn derive_regime(state: &BallMotionState, radius: f64) -> BallMotionState {
    let mut next = *state;
    let slip = relative_velocity(&state.velocity, &state.spin, radius);

    if !is_negligible(state.velocity.xy().norm()) {
        next.regime = if is_negligible(slip.xy().norm()) {
            BallRegime::Rolling
        } else {
            BallRegime::Sliding
        };
    } else if !is_negligible(state.spin.z) {
        next.regime = BallRegime::Spinning;
        next.spin.x = 0.0;
        next.spin.y = 0.0;
    } else {
        next = BallMotionState::at_rest(state.position);
    }
    next
}
