//! Ball motion reconstruction from a solved event timeline.
//!
//! Replays, never solves: the state at any query time is the active event's
//! snapshot advanced in closed form by the time elapsed since it. No state is
//! carried between frames, so a query is independent of every earlier one.

use nalgebra::Vector2;

use super::ball::{BallMotionState, BallRegime};
use super::kinematics::{self, FrictionParams, MotionDelta};
use super::timeline::{segment_at, MotionEvent};

/// State of a ball `query_time` seconds into the shot.
///
/// Returns `prior` unchanged when `events` is empty or the query is at or
/// before the first event: the ball has not been touched yet and keeps its
/// pre-shot state. Otherwise the regime is the active event's tag.
pub fn reconstruct(
    prior: &BallMotionState,
    events: &[MotionEvent],
    query_time: f64,
    params: &FrictionParams,
) -> BallMotionState {
    let touched = events.first().is_some_and(|first| query_time > first.time);
    match segment_at(events, query_time).filter(|_| touched) {
        Some(segment) => advance_event(segment.start, segment.elapsed, params),
        None => *prior,
    }
}

/// Closed-form motion `dt` seconds after a single event.
pub fn advance_event(event: &MotionEvent, dt: f64, params: &FrictionParams) -> BallMotionState {
    let delta = match event.regime {
        BallRegime::Rolling => kinematics::roll(&event.velocity, &event.spin, dt, params),
        BallRegime::Sliding => kinematics::slide(&event.velocity, &event.spin, dt, params),
        BallRegime::Spinning => MotionDelta {
            displacement: Vector2::zeros(),
            velocity: event.velocity,
            spin: kinematics::spin_in_place(&event.spin, dt, params),
        },
        _ => MotionDelta {
            displacement: Vector2::zeros(),
            velocity: event.velocity,
            spin: event.spin,
        },
    };

    BallMotionState {
        position: event.position + delta.displacement,
        velocity: delta.velocity,
        spin: delta.spin,
        regime: event.regime,
    }
}

/// The ball's state at the end of the shot: its last event, verbatim.
pub fn snap_to_final(events: &[MotionEvent]) -> Option<BallMotionState> {
    events.last().map(MotionEvent::state)
}

/// Frame sample for playback: reconstruct within the shot, snap once the
/// query passes `duration`.
pub fn sample(
    prior: &BallMotionState,
    events: &[MotionEvent],
    query_time: f64,
    duration: f64,
    params: &FrictionParams,
) -> BallMotionState {
    if query_time > duration {
        snap_to_final(events).unwrap_or(*prior)
    } else {
        reconstruct(prior, events, query_time, params)
    }
}
