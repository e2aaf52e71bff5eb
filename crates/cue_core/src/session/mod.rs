//! Game sessions: a queue of games, each a starting table plus a decider,
//! played shot by shot through an external solver and the playback
//! scheduler.
//!
//! The session keeps two tables. The *solver table* is where the balls end
//! up once every queued shot has played; deciders and the solver see only
//! this one. The *display table* is what playback animates.

pub mod deciders;
pub mod shot_trees;
pub mod turns;

pub use deciders::{BiasedNorthDecider, FixedShotDecider, ShotDecider, ShotListDecider};
pub use shot_trees::{AimOutcome, ShotTreeViewer};
pub use turns::{TurnHistoryPlayer, TurnShot};

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use nalgebra::Vector2;

use crate::engine::ball::BallNumber;
use crate::engine::config::CueConfig;
use crate::engine::table::{BallPlacement, Table};
use crate::error::{CoreError, Result};
use crate::models::shot::{ShotParams, ShotRecord};
use crate::playback::clock::Clock;
use crate::playback::scheduler::{ShotScheduler, TickOutcome};

/// The physics solver, seen from playback.
pub trait ShotSolver {
    /// Whether `params` is a legal stroke on `table`.
    fn is_possible(&mut self, table: &Table, params: &ShotParams) -> bool;

    /// Solve the stroke. Only called after `is_possible` said yes.
    fn execute(&mut self, table: &Table, params: &ShotParams) -> ShotRecord;
}

/// Solver stand-in that hands out shots solved earlier, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordedSolver {
    shots: VecDeque<ShotRecord>,
}

impl RecordedSolver {
    pub fn new(shots: impl IntoIterator<Item = ShotRecord>) -> Self {
        Self { shots: shots.into_iter().collect() }
    }

    /// Deciders that ask for exactly the recorded strokes.
    pub fn decider(&self) -> ShotListDecider {
        ShotListDecider::new(self.shots.iter().map(|s| s.params))
    }
}

impl ShotSolver for RecordedSolver {
    fn is_possible(&mut self, _table: &Table, params: &ShotParams) -> bool {
        self.shots.front().is_some_and(|s| s.params == *params)
    }

    fn execute(&mut self, _table: &Table, params: &ShotParams) -> ShotRecord {
        self.shots
            .pop_front()
            .unwrap_or_else(|| ShotRecord::new(*params, 0.0, Vec::new()))
    }
}

pub struct Game {
    pub table: Table,
    pub decider: Box<dyn ShotDecider>,
}

impl Game {
    pub fn new(table: Table, decider: impl ShotDecider + 'static) -> Self {
        Self { table, decider: Box::new(decider) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// 1-based number of the game now on the table
    Playing { game: usize },
    Finished,
}

/// Result of asking for the next shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShootOutcome {
    Queued,
    /// The game ended (cue ball pocketed, decider done, or impossible
    /// stroke) and the next one was loaded
    GameOver(SessionStatus),
    /// The solver returned a record that failed validation
    Rejected,
    Finished,
}

struct CurrentGame {
    decider: Box<dyn ShotDecider>,
    start: Vec<BallPlacement>,
}

pub struct GameSession<C: Clock> {
    games: VecDeque<Game>,
    current: Option<CurrentGame>,
    game_number: usize,
    display: Table,
    solver_table: Table,
    solver: Box<dyn ShotSolver>,
    scheduler: ShotScheduler<C>,
    auto_play: bool,
    shots_played: Rc<Cell<usize>>,
}

impl<C: Clock> GameSession<C> {
    /// Start playing `games` in order. All games must share table dimensions.
    pub fn play_games(
        games: Vec<Game>,
        solver: impl ShotSolver + 'static,
        config: &CueConfig,
        clock: C,
    ) -> Result<Self> {
        let first = games.first().ok_or(CoreError::NoGames)?;
        let reference = *first.table.config();
        if let Some(odd) = games.iter().find(|g| !g.table.config().same_dimensions(&reference)) {
            let other = odd.table.config();
            return Err(CoreError::TableMismatch(format!(
                "{}x{} vs {}x{}",
                reference.width, reference.length, other.width, other.length
            )));
        }

        let mut session = Self {
            games: games.into(),
            current: None,
            game_number: 0,
            display: Table::new(reference),
            solver_table: Table::new(reference),
            solver: Box::new(solver),
            scheduler: ShotScheduler::with_config(clock, &config.playback),
            auto_play: config.playback.auto_play,
            shots_played: Rc::new(Cell::new(0)),
        };
        session.next_game();
        Ok(session)
    }

    pub fn table(&self) -> &Table {
        &self.display
    }

    /// Where the balls will be once queued shots have played.
    pub fn solver_table(&self) -> &Table {
        &self.solver_table
    }

    pub fn scheduler(&self) -> &ShotScheduler<C> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut ShotScheduler<C> {
        &mut self.scheduler
    }

    pub fn status(&self) -> SessionStatus {
        match self.current {
            Some(_) => SessionStatus::Playing { game: self.game_number },
            None => SessionStatus::Finished,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    pub fn set_auto_play(&mut self, auto_play: bool) {
        self.auto_play = auto_play;
    }

    /// Shots that played to completion, across all games.
    pub fn shots_played(&self) -> usize {
        self.shots_played.get()
    }

    /// Load the next game, dropping anything still queued.
    pub fn next_game(&mut self) -> SessionStatus {
        self.scheduler.clear();
        match self.games.pop_front() {
            Some(game) => {
                self.game_number += 1;
                let start = game.table.placements();
                self.display = game.table.clone();
                self.solver_table = game.table;
                self.current = Some(CurrentGame { decider: game.decider, start });
                log::info!("game {}: {} balls", self.game_number, self.display.ball_count());
            }
            None => {
                if self.current.take().is_some() {
                    log::info!("no more games left");
                }
            }
        }
        self.status()
    }

    /// Put every ball back where the current game started.
    pub fn restart(&mut self) {
        let Some(current) = self.current.as_ref() else {
            return;
        };
        self.scheduler.clear();
        let config = *self.solver_table.config();
        self.solver_table = Table::from_positions(config, &current.start);
        self.display = self.solver_table.clone();
        log::info!("game {}: restarted", self.game_number);
    }

    /// Ask the decider for a stroke, solve it and queue it for playback.
    pub fn shoot(&mut self) -> ShootOutcome {
        if self.current.is_none() {
            return ShootOutcome::Finished;
        }

        if self.solver_table.is_pocketed(BallNumber::CUE) {
            log::info!("game {}: cue ball pocketed", self.game_number);
            if self.next_game() == SessionStatus::Finished {
                return ShootOutcome::Finished;
            }
        }

        let Some(current) = self.current.as_mut() else {
            return ShootOutcome::Finished;
        };
        let Some(params) = current.decider.decide(&self.solver_table) else {
            log::info!("game {}: no more shots left", self.game_number);
            return ShootOutcome::GameOver(self.next_game());
        };

        if !self.solver.is_possible(&self.solver_table, &params) {
            log::info!("game {}: shot not possible", self.game_number);
            return ShootOutcome::GameOver(self.next_game());
        }

        let record = self.solver.execute(&self.solver_table, &params);
        if let Err(err) = record.validate() {
            log::warn!("game {}: solver returned an invalid shot: {}", self.game_number, err);
            return ShootOutcome::Rejected;
        }

        self.solver_table.snap_to_end(&record);
        let played = self.shots_played.clone();
        self.scheduler.enqueue_with(record, move || played.set(played.get() + 1));
        ShootOutcome::Queued
    }

    /// Skip the rest of the current game.
    pub fn skip_game(&mut self) -> SessionStatus {
        log::info!("game {}: skipped", self.game_number);
        self.next_game()
    }

    /// Drag a ball while nothing is playing. Both tables follow.
    pub fn place_ball(&mut self, number: BallNumber, position: Vector2<f64>) -> Result<()> {
        if !self.scheduler.is_idle() || self.scheduler.queued() > 0 {
            return Err(CoreError::InvalidParameter("cannot move balls during playback".into()));
        }
        self.solver_table.place_ball(number, position)?;
        self.display.place_ball(number, position)
    }

    /// One frame: advance playback, and request the next shot when idle and
    /// auto-play is on.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.scheduler.tick(&mut self.display);
        if outcome == TickOutcome::Idle && self.auto_play && !self.is_finished() {
            self.shoot();
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ball::BallRegime;
    use crate::engine::config::TableConfig;
    use crate::engine::timeline::{BallTimeline, MotionEvent};
    use crate::playback::clock::ManualClock;
    use nalgebra::Vector3;

    /// Moves the cue ball 0.5 up the table per shot, or pockets it when the
    /// azimuth is 45.
    #[derive(Default)]
    struct FakeSolver {
        executed: usize,
    }

    impl ShotSolver for FakeSolver {
        fn is_possible(&mut self, _table: &Table, params: &ShotParams) -> bool {
            params.v < 5.0
        }

        fn execute(&mut self, table: &Table, params: &ShotParams) -> ShotRecord {
            self.executed += 1;
            let start = table.ball(BallNumber::CUE).map(|b| b.state.position).unwrap_or_default();
            let end = if params.phi == 45.0 {
                MotionEvent::new(0.8, Vector2::zeros(), BallRegime::PocketedSw)
            } else {
                MotionEvent::new(0.8, start + Vector2::new(0.0, 0.5), BallRegime::Stationary)
            };
            ShotRecord::new(
                *params,
                1.0,
                vec![BallTimeline::new(
                    BallNumber::CUE,
                    vec![
                        MotionEvent::new(0.0, start, BallRegime::Rolling).with_velocity(Vector3::new(0.0, 1.0, 0.0)),
                        end,
                    ],
                )],
            )
        }
    }

    fn table() -> Table {
        Table::from_positions(
            TableConfig::default(),
            &[BallPlacement::new(BallNumber::CUE, Vector2::new(0.5, 0.3), BallRegime::Stationary)],
        )
    }

    fn north_list(n: usize) -> ShotListDecider {
        ShotListDecider::new(std::iter::repeat(FixedShotDecider::north().params).take(n))
    }

    fn session(games: Vec<Game>, clock: &ManualClock) -> GameSession<ManualClock> {
        GameSession::play_games(games, FakeSolver::default(), &CueConfig::default(), clock.clone()).unwrap()
    }

    fn cue_y(table: &Table) -> f64 {
        table.ball(BallNumber::CUE).map(|b| b.state.position.y).unwrap_or(f64::NAN)
    }

    #[test]
    fn test_rejects_empty_and_mismatched_games() {
        let clock = ManualClock::new();
        let empty = GameSession::play_games(Vec::new(), FakeSolver::default(), &CueConfig::default(), clock.clone());
        assert!(matches!(empty, Err(CoreError::NoGames)));

        let big = TableConfig { width: 1.27, length: 2.54, ..Default::default() };
        let games = vec![
            Game::new(table(), north_list(1)),
            Game::new(Table::new(big), north_list(1)),
        ];
        let mixed = GameSession::play_games(games, FakeSolver::default(), &CueConfig::default(), clock);
        assert!(matches!(mixed, Err(CoreError::TableMismatch(_))));
    }

    #[test]
    fn test_shoot_queues_and_updates_solver_table() {
        let clock = ManualClock::new();
        let mut s = session(vec![Game::new(table(), north_list(2))], &clock);
        assert_eq!(s.status(), SessionStatus::Playing { game: 1 });

        assert_eq!(s.shoot(), ShootOutcome::Queued);
        assert!((cue_y(s.solver_table()) - 0.8).abs() < 1e-12);
        assert!((cue_y(s.table()) - 0.3).abs() < 1e-12);

        s.tick();
        clock.advance(1.5);
        assert_eq!(s.tick(), TickOutcome::Completed);
        assert!((cue_y(s.table()) - 0.8).abs() < 1e-12);
        assert_eq!(s.shots_played(), 1);
    }

    #[test]
    fn test_decider_exhaustion_moves_to_next_game() {
        let clock = ManualClock::new();
        let mut s = session(
            vec![Game::new(table(), north_list(1)), Game::new(table(), north_list(1))],
            &clock,
        );
        assert_eq!(s.shoot(), ShootOutcome::Queued);
        assert_eq!(s.shoot(), ShootOutcome::GameOver(SessionStatus::Playing { game: 2 }));
        assert_eq!(s.scheduler().queued(), 0);
        assert_eq!(s.shoot(), ShootOutcome::Queued);
        assert_eq!(s.shoot(), ShootOutcome::GameOver(SessionStatus::Finished));
        assert!(s.is_finished());
        assert_eq!(s.shoot(), ShootOutcome::Finished);
    }

    #[test]
    fn test_impossible_shot_ends_game() {
        let clock = ManualClock::new();
        let hard = ShotListDecider::new([ShotParams::new(9.0, 0.0, 0.0, 0.0, 0.0)]);
        let mut s = session(vec![Game::new(table(), hard)], &clock);
        assert_eq!(s.shoot(), ShootOutcome::GameOver(SessionStatus::Finished));
    }

    #[test]
    fn test_pocketed_cue_ball_ends_game_before_next_decision() {
        let clock = ManualClock::new();
        let games = vec![
            Game::new(table(), FixedShotDecider::hole()),
            Game::new(table(), north_list(1)),
        ];
        let mut s = session(games, &clock);
        assert_eq!(s.shoot(), ShootOutcome::Queued);
        assert!(s.solver_table().is_pocketed(BallNumber::CUE));

        // Next shot comes from game 2's decider.
        assert_eq!(s.shoot(), ShootOutcome::Queued);
        assert_eq!(s.status(), SessionStatus::Playing { game: 2 });
        assert_eq!(s.scheduler().active_shot().map(|r| r.params.phi), None);
        assert_eq!(s.scheduler().queued(), 1);
    }

    #[test]
    fn test_restart_restores_start_and_cancels() {
        let clock = ManualClock::new();
        let mut s = session(vec![Game::new(table(), north_list(3))], &clock);
        s.shoot();
        s.tick();
        clock.advance(0.5);
        s.tick();
        assert!(cue_y(s.table()) > 0.3);

        s.restart();
        assert!(s.scheduler().is_idle());
        assert_eq!(s.scheduler().queued(), 0);
        assert!((cue_y(s.table()) - 0.3).abs() < 1e-12);
        assert!((cue_y(s.solver_table()) - 0.3).abs() < 1e-12);
        clock.advance(5.0);
        s.tick();
        assert_eq!(s.shots_played(), 0);
    }

    #[test]
    fn test_auto_play_requests_shots_when_idle() {
        let clock = ManualClock::new();
        let mut s = session(vec![Game::new(table(), north_list(2))], &clock);
        s.set_auto_play(true);

        for _ in 0..20 {
            s.tick();
            clock.advance(0.25);
        }
        assert_eq!(s.shots_played(), 2);
        assert!(s.is_finished());
        assert!((cue_y(s.table()) - 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_place_ball_only_when_idle() {
        let clock = ManualClock::new();
        let mut s = session(vec![Game::new(table(), north_list(1))], &clock);
        s.place_ball(BallNumber::CUE, Vector2::new(0.2, 0.2)).unwrap();
        assert_eq!(s.table().ball(BallNumber::CUE).map(|b| b.state.position), Some(Vector2::new(0.2, 0.2)));

        s.shoot();
        assert!(s.place_ball(BallNumber::CUE, Vector2::new(0.4, 0.4)).is_err());
    }

    #[test]
    fn test_recorded_solver_replays_in_order() {
        let mut fake = FakeSolver::default();
        let t = table();
        let a = fake.execute(&t, &FixedShotDecider::north().params);
        let b = fake.execute(&t, &FixedShotDecider::hole().params);
        let mut solver = RecordedSolver::new([a.clone(), b.clone()]);
        let mut decider = solver.decider();

        let p = decider.decide(&t).unwrap();
        assert!(solver.is_possible(&t, &p));
        assert_eq!(solver.execute(&t, &p), a);
        let p = decider.decide(&t).unwrap();
        assert_eq!(solver.execute(&t, &p), b);
        assert!(decider.decide(&t).is_none());
        assert!(!solver.is_possible(&t, &p));
    }
}
