//! Replay of a recorded game, one turn at a time.
//!
//! Each turn carries the table as it stood before the stroke, so any turn
//! can be shown on its own. Shooting re-solves the recorded stroke from that
//! table. When a shot finishes the player moves to the next turn, and with
//! auto-play on it shoots that one as well.

use std::cell::Cell;
use std::rc::Rc;

use crate::engine::config::{CueConfig, TableConfig};
use crate::engine::table::Table;
use crate::models::shot::ShotParams;
use crate::models::turn::{GameTurn, TurnHighlight};
use crate::playback::clock::Clock;
use crate::playback::scheduler::{ShotScheduler, TickOutcome};

use super::ShotSolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnShot {
    Queued,
    /// The turn was a concession; there is nothing to play
    Conceded,
    /// No turn loaded, or this turn's shot was already played. Reset first.
    Unavailable,
    /// The solver returned a record that failed validation
    Rejected,
}

pub struct TurnHistoryPlayer<C: Clock> {
    config: TableConfig,
    turns: Vec<GameTurn>,
    active: usize,
    table: Table,
    solver: Box<dyn ShotSolver>,
    scheduler: ShotScheduler<C>,
    shot_available: bool,
    auto_play: bool,
    highlight: TurnHighlight,
    shown_params: Option<ShotParams>,
    shot_finished: Rc<Cell<bool>>,
}

impl<C: Clock> TurnHistoryPlayer<C> {
    pub fn new(solver: impl ShotSolver + 'static, config: &CueConfig, clock: C) -> Self {
        Self {
            config: config.table,
            turns: Vec::new(),
            active: 0,
            table: Table::new(config.table),
            solver: Box::new(solver),
            scheduler: ShotScheduler::with_config(clock, &config.playback),
            shot_available: false,
            auto_play: config.playback.auto_play,
            highlight: TurnHighlight::default(),
            shown_params: None,
            shot_finished: Rc::new(Cell::new(false)),
        }
    }

    /// Replace the history, show the first turn and shoot it.
    pub fn load(&mut self, turns: Vec<GameTurn>) -> TurnShot {
        log::info!("loaded {} turns", turns.len());
        self.turns = turns;
        self.active = 0;
        if self.turns.is_empty() {
            self.scheduler.clear();
            self.shot_available = false;
            self.highlight = TurnHighlight::default();
            self.shown_params = None;
            return TurnShot::Unavailable;
        }
        self.show_active();
        self.shoot()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn turns(&self) -> &[GameTurn] {
        &self.turns
    }

    pub fn active_index(&self) -> Option<usize> {
        (!self.turns.is_empty()).then_some(self.active)
    }

    pub fn active_turn(&self) -> Option<&GameTurn> {
        self.turns.get(self.active)
    }

    pub fn highlight(&self) -> TurnHighlight {
        self.highlight
    }

    /// Stroke of the shown turn, until it is played.
    pub fn shown_params(&self) -> Option<ShotParams> {
        self.shown_params
    }

    pub fn is_shot_available(&self) -> bool {
        self.shot_available
    }

    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    pub fn set_auto_play(&mut self, auto_play: bool) {
        self.auto_play = auto_play;
    }

    pub fn toggle_auto_play(&mut self) -> bool {
        self.auto_play = !self.auto_play;
        log::info!("auto-play {}", if self.auto_play { "on" } else { "off" });
        self.auto_play
    }

    pub fn scheduler(&self) -> &ShotScheduler<C> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut ShotScheduler<C> {
        &mut self.scheduler
    }

    /// Move one turn forward or back, stopping at either end.
    pub fn shift(&mut self, forward: bool) -> Option<&GameTurn> {
        if self.turns.is_empty() {
            return None;
        }
        self.active = if forward {
            (self.active + 1).min(self.turns.len() - 1)
        } else {
            self.active.saturating_sub(1)
        };
        self.show_active();
        self.active_turn()
    }

    /// Put the shown turn's table back and make its shot playable again.
    pub fn reset(&mut self) {
        if self.turns.is_empty() {
            return;
        }
        self.restore_table();
    }

    /// Solve and queue the shown turn's stroke.
    pub fn shoot(&mut self) -> TurnShot {
        let Some(turn) = self.turns.get(self.active) else {
            return TurnShot::Unavailable;
        };
        if !self.shot_available {
            return TurnShot::Unavailable;
        }
        if turn.is_concede() {
            log::info!("turn {}: conceded", self.active + 1);
            return TurnShot::Conceded;
        }

        let record = self.solver.execute(&self.table, &turn.params);
        if let Err(err) = record.validate() {
            log::warn!("turn {}: solver returned an invalid shot: {}", self.active + 1, err);
            return TurnShot::Rejected;
        }

        let finished = self.shot_finished.clone();
        self.scheduler.enqueue_with(record, move || finished.set(true));
        self.shot_available = false;
        self.shown_params = None;
        TurnShot::Queued
    }

    /// One frame. After a shot finishes, move on to the next turn, and shoot
    /// it when auto-play is on.
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.scheduler.tick(&mut self.table);
        if self.shot_finished.replace(false) && self.active + 1 < self.turns.len() {
            self.shift(true);
            if self.auto_play {
                self.shoot();
            }
        }
        outcome
    }

    fn show_active(&mut self) {
        let Some(turn) = self.turns.get(self.active) else {
            return;
        };
        log::info!(
            "turn {}/{} - {} - {:?} - {:?} - {}",
            self.active + 1,
            self.turns.len(),
            turn.agent,
            turn.decision,
            turn.turn_type,
            turn.result
        );
        self.highlight = turn.highlight();
        self.restore_table();
    }

    fn restore_table(&mut self) {
        let Some(turn) = self.turns.get(self.active) else {
            return;
        };
        self.scheduler.clear();
        self.shot_finished.set(false);
        self.table = Table::from_positions(self.config, &turn.table_before);
        self.shown_params = Some(turn.params);
        self.shot_available = true;
    }
}
