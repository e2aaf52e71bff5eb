//! The ball set on one table.
//!
//! Balls are stored in a fixed array indexed by ball number, so lookups are
//! direct and the set can never hold two balls with the same number.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::ball::{BallMotionState, BallNumber, BallRegime, GameBall};
use super::config::TableConfig;
use super::kinematics::FrictionParams;
use super::layout::TableLayout;
use super::physics_constants::ball;
use super::reconstruct::{reconstruct, snap_to_final};
use crate::error::{CoreError, Result};
use crate::models::shot::ShotRecord;

/// Initial position of one ball, as handed over by the table setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallPlacement {
    pub ball: BallNumber,
    pub position: Vector2<f64>,
    #[serde(default)]
    pub regime: BallRegime,
}

impl BallPlacement {
    pub fn new(ball: BallNumber, position: Vector2<f64>, regime: BallRegime) -> Self {
        Self { ball, position, regime }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    config: TableConfig,
    balls: [Option<GameBall>; ball::COUNT],
}

impl Table {
    pub fn new(config: TableConfig) -> Self {
        Self { config, balls: Default::default() }
    }

    /// Table with the given balls; a later placement of the same number wins.
    pub fn from_positions(config: TableConfig, placements: &[BallPlacement]) -> Self {
        let mut table = Self::new(config);
        for p in placements {
            table.set_state(p.ball, BallMotionState::placed(p.position, p.regime));
        }
        table
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn friction(&self) -> FrictionParams {
        self.config.friction()
    }

    pub fn layout(&self) -> TableLayout {
        TableLayout::new(&self.config)
    }

    pub fn ball(&self, number: BallNumber) -> Option<&GameBall> {
        self.balls[number.index()].as_ref()
    }

    pub fn ball_mut(&mut self, number: BallNumber) -> Option<&mut GameBall> {
        self.balls[number.index()].as_mut()
    }

    /// Balls present on this table, in number order.
    pub fn balls(&self) -> impl Iterator<Item = &GameBall> {
        self.balls.iter().flatten()
    }

    pub fn ball_count(&self) -> usize {
        self.balls().count()
    }

    /// Overwrite a ball's state, adding the ball if absent.
    pub fn set_state(&mut self, number: BallNumber, state: BallMotionState) {
        let radius = self.config.ball_radius;
        let slot = &mut self.balls[number.index()];
        if let Some(existing) = slot.as_mut() {
            existing.state = state;
        } else {
            *slot = Some(GameBall::new(number, radius, state));
        }
    }

    pub fn is_pocketed(&self, number: BallNumber) -> bool {
        self.ball(number).is_some_and(|b| b.state.regime.is_pocketed())
    }

    /// Drag a ball to a new surface position. Only balls on the table can be
    /// moved; they end up stationary.
    pub fn place_ball(&mut self, number: BallNumber, position: Vector2<f64>) -> Result<()> {
        let ball = self
            .ball_mut(number)
            .filter(|b| b.state.regime.is_visible())
            .ok_or(CoreError::BallNotPlaceable(number))?;
        ball.state = BallMotionState::at_rest(position);
        Ok(())
    }

    /// First visible ball under `point` (surface coordinates).
    pub fn ball_at(&self, point: Vector2<f64>) -> Option<BallNumber> {
        self.balls()
            .find(|b| b.state.regime.is_visible() && b.contains(point))
            .map(|b| b.number)
    }

    /// Reconstruct every ball at `elapsed` seconds into `shot`. Balls the
    /// shot does not involve are left alone.
    pub fn apply_shot_at(&mut self, shot: &ShotRecord, elapsed: f64) {
        let params = self.friction();
        for timeline in &shot.timelines {
            if let Some(ball) = self.balls[timeline.ball.index()].as_mut() {
                ball.state = reconstruct(&ball.state, &timeline.events, elapsed, &params);
            }
        }
    }

    /// Force every involved ball to its final recorded state.
    pub fn snap_to_end(&mut self, shot: &ShotRecord) {
        for timeline in &shot.timelines {
            if let Some(ball) = self.balls[timeline.ball.index()].as_mut() {
                if let Some(last) = snap_to_final(&timeline.events) {
                    ball.state = last;
                }
            }
        }
    }

    pub fn placements(&self) -> Vec<BallPlacement> {
        self.balls()
            .map(|b| BallPlacement::new(b.number, b.state.position, b.state.regime))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::timeline::{BallTimeline, MotionEvent};
    use crate::models::shot::ShotParams;
    use nalgebra::Vector3;

    fn n(number: u8) -> BallNumber {
        BallNumber::new(number).unwrap()
    }

    fn table() -> Table {
        Table::from_positions(
            TableConfig::default(),
            &[
                BallPlacement::new(BallNumber::CUE, Vector2::new(0.58, 0.5), BallRegime::Stationary),
                BallPlacement::new(n(1), Vector2::new(0.58, 1.7), BallRegime::Stationary),
                BallPlacement::new(n(9), Vector2::new(0.0, 0.0), BallRegime::PocketedSw),
            ],
        )
    }

    fn shot() -> ShotRecord {
        ShotRecord::new(
            ShotParams::new(1.0, 0.0, 0.0, 5.0, 90.0),
            1.0,
            vec![BallTimeline::new(
                BallNumber::CUE,
                vec![
                    MotionEvent::new(0.0, Vector2::new(0.58, 0.5), BallRegime::Rolling)
                        .with_velocity(Vector3::new(0.0, 1.0, 0.0)),
                    MotionEvent::new(1.0, Vector2::new(0.58, 1.4), BallRegime::Stationary),
                ],
            )],
        )
    }

    #[test]
    fn test_from_positions() {
        let t = table();
        assert_eq!(t.ball_count(), 3);
        assert!(t.ball(n(2)).is_none());
        assert_eq!(t.ball(n(1)).unwrap().radius, ball::RADIUS_M);
        assert!(t.is_pocketed(n(9)));
        let numbers: Vec<u8> = t.balls().map(|b| b.number.get()).collect();
        assert_eq!(numbers, vec![0, 1, 9]);
    }

    #[test]
    fn test_place_ball() {
        let mut t = table();
        t.place_ball(n(1), Vector2::new(0.3, 0.3)).unwrap();
        assert_eq!(t.ball(n(1)).unwrap().state.position, Vector2::new(0.3, 0.3));

        assert!(matches!(t.place_ball(n(9), Vector2::new(0.3, 0.3)), Err(CoreError::BallNotPlaceable(_))));
        assert!(t.place_ball(n(4), Vector2::new(0.3, 0.3)).is_err());
    }

    #[test]
    fn test_ball_at_skips_pocketed() {
        let t = table();
        assert_eq!(t.ball_at(Vector2::new(0.59, 0.5)), Some(BallNumber::CUE));
        assert_eq!(t.ball_at(Vector2::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_apply_and_snap() {
        let mut t = table();
        let record = shot();
        t.apply_shot_at(&record, 0.5);
        let cue = t.ball(BallNumber::CUE).unwrap().state;
        assert_eq!(cue.regime, BallRegime::Rolling);
        assert!(cue.position.y > 0.5);
        assert_eq!(t.ball(n(1)).unwrap().state.position, Vector2::new(0.58, 1.7));

        t.snap_to_end(&record);
        let cue = t.ball(BallNumber::CUE).unwrap().state;
        assert_eq!(cue.position, Vector2::new(0.58, 1.4));
        assert_eq!(cue.regime, BallRegime::Stationary);
    }

    #[test]
    fn test_placements_round_trip() {
        let t = table();
        let rebuilt = Table::from_positions(*t.config(), &t.placements());
        assert_eq!(rebuilt, t);
    }
}
