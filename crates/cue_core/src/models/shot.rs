use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::engine::ball::{BallMotionState, BallNumber, BallRegime};
use crate::engine::physics_constants::ball;
use crate::engine::timeline::{BallTimeline, EventCause, MotionEvent};
use crate::error::{CoreError, Result};

/// Cue stroke parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotParams {
    /// Cue speed (m/s)
    pub v: f64,
    /// Horizontal tip offset
    pub a: f64,
    /// Vertical tip offset
    pub b: f64,
    /// Cue elevation (degrees)
    pub theta: f64,
    /// Cue azimuth (degrees)
    pub phi: f64,
}

impl ShotParams {
    pub fn new(v: f64, a: f64, b: f64, theta: f64, phi: f64) -> Self {
        Self { v, a, b, theta, phi }
    }

    pub fn validate(&self) -> Result<()> {
        let all = [self.v, self.a, self.b, self.theta, self.phi];
        if all.iter().any(|x| !x.is_finite()) {
            return Err(CoreError::InvalidParameter(format!("non-finite shot params: {:?}", self)));
        }
        if self.v <= 0.0 {
            return Err(CoreError::InvalidParameter(format!("cue speed must be positive, got {}", self.v)));
        }
        Ok(())
    }
}

/// One ball's snapshot inside a solver event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub ball: BallNumber,
    pub position: Vector2<f64>,
    #[serde(default)]
    pub velocity: Vector3<f64>,
    #[serde(default)]
    pub spin: Vector3<f64>,
    pub regime: BallRegime,
}

impl BallSnapshot {
    pub fn state(&self) -> BallMotionState {
        BallMotionState {
            position: self.position,
            velocity: self.velocity,
            spin: self.spin,
            regime: self.regime,
        }
    }
}

/// Event as the solver reports it: a time and the one or two balls involved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverEvent {
    pub time: f64,
    #[serde(default)]
    pub cause: EventCause,
    pub ball1: Option<BallSnapshot>,
    #[serde(default)]
    pub ball2: Option<BallSnapshot>,
}

impl SolverEvent {
    /// Snapshot of `number` if this event involves it. `ball1` wins when both
    /// slots name the same ball.
    pub fn snapshot_of(&self, number: BallNumber) -> Option<&BallSnapshot> {
        self.ball1
            .as_ref()
            .filter(|s| s.ball == number)
            .or_else(|| self.ball2.as_ref().filter(|s| s.ball == number))
    }
}

/// A solved shot: stroke, per-ball event timelines and total duration.
///
/// Produced by the solver, consumed read-only by playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub params: ShotParams,
    /// Seconds until every ball is at rest
    pub duration: f64,
    #[serde(default)]
    pub timelines: Vec<BallTimeline>,
}

impl ShotRecord {
    pub fn new(params: ShotParams, duration: f64, timelines: Vec<BallTimeline>) -> Self {
        Self { params, duration, timelines }
    }

    /// Split the solver's flat event list into per-ball timelines.
    ///
    /// Solver order is kept. When a ball has several snapshots at the same
    /// instant only the last one survives, so each timeline is strictly
    /// ordered as long as the input times never decrease.
    pub fn from_event_list(params: ShotParams, duration: f64, events: &[SolverEvent]) -> Self {
        let mut per_ball: [Vec<MotionEvent>; ball::COUNT] = Default::default();

        for event in events {
            for number in BallNumber::all() {
                let Some(snapshot) = event.snapshot_of(number) else {
                    continue;
                };
                let motion = MotionEvent {
                    time: event.time,
                    position: snapshot.position,
                    velocity: snapshot.velocity,
                    spin: snapshot.spin,
                    regime: snapshot.regime,
                    cause: event.cause,
                };
                let list = &mut per_ball[number.index()];
                match list.last_mut() {
                    Some(last) if last.time == motion.time => {
                        log::debug!("ball {} has two snapshots at t={:.4}, keeping the later", number, motion.time);
                        *last = motion;
                    }
                    _ => list.push(motion),
                }
            }
        }

        let timelines = BallNumber::all()
            .zip(per_ball)
            .filter(|(_, events)| !events.is_empty())
            .map(|(number, events)| BallTimeline::new(number, events))
            .collect();

        Self { params, duration, timelines }
    }

    pub fn timeline(&self, number: BallNumber) -> Option<&BallTimeline> {
        self.timelines.iter().find(|t| t.ball == number)
    }

    /// Events of `number`, empty when the ball is not involved.
    pub fn events(&self, number: BallNumber) -> &[MotionEvent] {
        self.timeline(number).map(|t| t.events.as_slice()).unwrap_or(&[])
    }

    pub fn event_count(&self) -> usize {
        self.timelines.iter().map(BallTimeline::len).sum()
    }

    /// Check a record received from outside before it is played.
    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(CoreError::InvalidParameter(format!("shot duration {}", self.duration)));
        }
        let mut seen = [false; ball::COUNT];
        for timeline in &self.timelines {
            if std::mem::replace(&mut seen[timeline.ball.index()], true) {
                return Err(CoreError::DuplicateTimeline(timeline.ball));
            }
            timeline.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(n: u8, x: f64, regime: BallRegime) -> BallSnapshot {
        BallSnapshot {
            ball: BallNumber::new(n).unwrap(),
            position: Vector2::new(x, 0.5),
            velocity: Vector3::zeros(),
            spin: Vector3::zeros(),
            regime,
        }
    }

    fn params() -> ShotParams {
        ShotParams::new(1.5, 0.0, 0.0, 11.0, 270.0)
    }

    #[test]
    fn test_params_validation() {
        assert!(params().validate().is_ok());
        assert!(ShotParams::new(0.0, 0.0, 0.0, 0.0, 0.0).validate().is_err());
        assert!(ShotParams::new(1.0, f64::NAN, 0.0, 0.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_from_event_list_splits_per_ball() {
        let events = vec![
            SolverEvent {
                time: 0.0,
                cause: EventCause::CueStrike,
                ball1: Some(snapshot(0, 0.1, BallRegime::Sliding)),
                ball2: None,
            },
            SolverEvent {
                time: 0.4,
                cause: EventCause::BallCollision,
                ball1: Some(snapshot(0, 0.4, BallRegime::Sliding)),
                ball2: Some(snapshot(3, 0.45, BallRegime::Sliding)),
            },
            SolverEvent {
                time: 1.2,
                cause: EventCause::StateTransition,
                ball1: Some(snapshot(3, 0.9, BallRegime::Stationary)),
                ball2: None,
            },
        ];
        let record = ShotRecord::from_event_list(params(), 1.5, &events);

        assert_eq!(record.timelines.len(), 2);
        assert_eq!(record.events(BallNumber::CUE).len(), 2);
        let three = record.events(BallNumber::new(3).unwrap());
        assert_eq!(three.len(), 2);
        assert_eq!(three[0].cause, EventCause::BallCollision);
        assert_eq!(three[1].regime, BallRegime::Stationary);
        assert!(record.events(BallNumber::EIGHT).is_empty());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_same_instant_snapshots_collapse() {
        let events = vec![
            SolverEvent { time: 0.5, cause: EventCause::RailCollision, ball1: Some(snapshot(1, 0.2, BallRegime::Sliding)), ball2: None },
            SolverEvent { time: 0.5, cause: EventCause::StateTransition, ball1: Some(snapshot(1, 0.2, BallRegime::Rolling)), ball2: None },
        ];
        let record = ShotRecord::from_event_list(params(), 1.0, &events);
        let one = record.events(BallNumber::new(1).unwrap());
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].regime, BallRegime::Rolling);
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        let tl = BallTimeline::new(BallNumber::CUE, vec![MotionEvent::new(0.0, Vector2::zeros(), BallRegime::Stationary)]);

        let negative = ShotRecord::new(params(), -1.0, vec![]);
        assert!(negative.validate().is_err());

        let dup = ShotRecord::new(params(), 1.0, vec![tl.clone(), tl.clone()]);
        assert!(matches!(dup.validate(), Err(CoreError::DuplicateTimeline(_))));

        let unordered = BallTimeline::new(
            BallNumber::CUE,
            vec![
                MotionEvent::new(0.5, Vector2::zeros(), BallRegime::Rolling),
                MotionEvent::new(0.2, Vector2::zeros(), BallRegime::Stationary),
            ],
        );
        let record = ShotRecord::new(params(), 1.0, vec![unordered]);
        assert!(matches!(record.validate(), Err(CoreError::UnorderedTimeline { .. })));
    }

    #[test]
    fn test_record_json() {
        let json = r#"{
            "params": {"v": 1.5, "a": 0.0, "b": 0.0, "theta": 11.0, "phi": 270.0},
            "duration": 2.0,
            "timelines": [
                {"ball": 0, "events": [
                    {"time": 0.0, "position": [0.5, 0.5], "velocity": [0.0, -1.5, 0.0], "spin": [0.0, 0.0, 0.0], "regime": 3}
                ]}
            ]
        }"#;
        let record: ShotRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.duration, 2.0);
        assert_eq!(record.events(BallNumber::CUE)[0].regime, BallRegime::Sliding);
        assert_eq!(record.event_count(), 1);
    }
}
