//! Per-ball event timelines.
//!
//! The solver reports a snapshot every time a ball changes regime (cue
//! strike, collision, rail, pocket, friction transition). Between two
//! snapshots the motion is closed-form, so finding the active segment for a
//! query time is all the reconstructor needs.

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::ball::{BallMotionState, BallNumber, BallRegime};
use crate::error::{CoreError, Result};

/// What produced an event. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCause {
    CueStrike,
    BallCollision,
    RailCollision,
    Pocketed,
    StateTransition,
    #[default]
    Unknown,
}

/// Snapshot of one ball at a regime change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    /// Seconds since shot start
    pub time: f64,
    pub position: Vector2<f64>,
    pub velocity: Vector3<f64>,
    pub spin: Vector3<f64>,
    pub regime: BallRegime,
    #[serde(default)]
    pub cause: EventCause,
}

impl MotionEvent {
    pub fn new(time: f64, position: Vector2<f64>, regime: BallRegime) -> Self {
        Self {
            time,
            position,
            velocity: Vector3::zeros(),
            spin: Vector3::zeros(),
            regime,
            cause: EventCause::Unknown,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_spin(mut self, spin: Vector3<f64>) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_cause(mut self, cause: EventCause) -> Self {
        self.cause = cause;
        self
    }

    /// The recorded snapshot as a motion state.
    pub fn state(&self) -> BallMotionState {
        BallMotionState {
            position: self.position,
            velocity: self.velocity,
            spin: self.spin,
            regime: self.regime,
        }
    }
}

/// The active event for a query time and how far into it the query falls.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    pub index: usize,
    pub start: &'a MotionEvent,
    /// Query time minus `start.time`, never negative
    pub elapsed: f64,
}

/// Ordered event list of one ball during one shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallTimeline {
    pub ball: BallNumber,
    pub events: Vec<MotionEvent>,
}

impl BallTimeline {
    pub fn new(ball: BallNumber, events: Vec<MotionEvent>) -> Self {
        Self { ball, events }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn first(&self) -> Option<&MotionEvent> {
        self.events.first()
    }

    pub fn last(&self) -> Option<&MotionEvent> {
        self.events.last()
    }

    /// Latest event with `time <= query_time`.
    ///
    /// `None` when the timeline is empty or the query precedes the first
    /// event. Assumes the events are time-ordered; see [`Self::validate`].
    pub fn segment_at(&self, query_time: f64) -> Option<Segment<'_>> {
        segment_at(&self.events, query_time)
    }

    /// Strictly increasing event times.
    pub fn validate(&self) -> Result<()> {
        for (index, pair) in self.events.windows(2).enumerate() {
            if !(pair[1].time > pair[0].time) {
                return Err(CoreError::UnorderedTimeline { ball: self.ball, index: index + 1 });
            }
        }
        if let Some(first) = self.events.first() {
            if first.time < 0.0 || !first.time.is_finite() {
                return Err(CoreError::UnorderedTimeline { ball: self.ball, index: 0 });
            }
        }
        Ok(())
    }
}

/// Segment selection over a bare event slice.
pub fn segment_at(events: &[MotionEvent], query_time: f64) -> Option<Segment<'_>> {
    let after = events.partition_point(|e| e.time <= query_time);
    if after == 0 {
        return None;
    }
    let index = after - 1;
    let start = &events[index];
    Some(Segment { index, start, elapsed: (query_time - start.time).max(0.0) })
}
