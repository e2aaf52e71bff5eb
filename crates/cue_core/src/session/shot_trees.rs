//! Shot-tree viewer: browse the candidate shot chains computed for one
//! table and play the first stroke of the shown chain.
//!
//! Every shot is solved from the table the trees were computed for, no
//! matter what playback has done to the displayed table since.

use crate::engine::config::{CueConfig, TableConfig};
use crate::engine::table::{BallPlacement, Table};
use crate::models::shot::ShotParams;
use crate::models::shot_tree::{ShotTree, ShotTreeBrowser};
use crate::playback::clock::Clock;
use crate::playback::scheduler::{ShotScheduler, TickOutcome};

use super::ShotSolver;

/// Stroke speed before any key is pressed.
pub const DEFAULT_SPEED_KEY: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimOutcome {
    Queued(ShotParams),
    /// The solver refused the aimed stroke
    NotPossible(ShotParams),
    /// No tree to aim with, or its ghost ball sits on the cue ball
    NoTarget,
    /// The solver returned a record that failed validation
    Rejected,
}

pub struct ShotTreeViewer<C: Clock> {
    config: TableConfig,
    start: Table,
    table: Table,
    browser: ShotTreeBrowser,
    solver: Box<dyn ShotSolver>,
    scheduler: ShotScheduler<C>,
    speed_key: u8,
}

impl<C: Clock> ShotTreeViewer<C> {
    pub fn new(solver: impl ShotSolver + 'static, config: &CueConfig, clock: C) -> Self {
        Self {
            config: config.table,
            start: Table::new(config.table),
            table: Table::new(config.table),
            browser: ShotTreeBrowser::default(),
            solver: Box::new(solver),
            scheduler: ShotScheduler::with_config(clock, &config.playback),
            speed_key: DEFAULT_SPEED_KEY,
        }
    }

    /// New table and the trees computed for it.
    pub fn load(&mut self, placements: &[BallPlacement], trees: Vec<ShotTree>) {
        log::info!("{} shot trees for {} balls", trees.len(), placements.len());
        self.start = Table::from_positions(self.config, placements);
        self.browser.replace(trees);
        self.reset();
    }

    /// Replace the trees, keeping the table.
    pub fn set_trees(&mut self, trees: Vec<ShotTree>) {
        self.browser.replace(trees);
        self.reset();
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn active_tree(&self) -> Option<&ShotTree> {
        self.browser.active()
    }

    pub fn browser(&self) -> &ShotTreeBrowser {
        &self.browser
    }

    pub fn scheduler(&self) -> &ShotScheduler<C> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut ShotScheduler<C> {
        &mut self.scheduler
    }

    /// Stroke speed in m/s; equal to the selected key.
    pub fn speed(&self) -> f64 {
        f64::from(self.speed_key)
    }

    /// Pick the stroke speed with a number key, 1 through 9. The table is
    /// reset so the next shot starts clean. Other keys are ignored.
    pub fn select_speed(&mut self, key: u8) -> bool {
        if !(1..=9).contains(&key) {
            return false;
        }
        self.speed_key = key;
        log::info!("stroke speed {}", key);
        self.reset();
        true
    }

    /// Drop playback and show the starting table again.
    pub fn reset(&mut self) {
        self.scheduler.clear();
        self.table = self.start.clone();
    }

    pub fn next(&mut self) -> Option<&ShotTree> {
        self.reset();
        self.browser.next()
    }

    pub fn previous(&mut self) -> Option<&ShotTree> {
        self.reset();
        self.browser.previous()
    }

    /// Aim the shown tree's first shot at the selected speed and queue it if
    /// the solver accepts the stroke.
    pub fn shoot(&mut self) -> AimOutcome {
        let aimed = self.browser.active().and_then(ShotTree::root_node).and_then(|node| node.aim(self.speed()));
        let Some(params) = aimed else {
            return AimOutcome::NoTarget;
        };

        if !self.solver.is_possible(&self.start, &params) {
            log::info!("shot not possible: v={} phi={:.1}", params.v, params.phi);
            return AimOutcome::NotPossible(params);
        }

        let record = self.solver.execute(&self.start, &params);
        if let Err(err) = record.validate() {
            log::warn!("solver returned an invalid shot: {}", err);
            return AimOutcome::Rejected;
        }
        self.scheduler.enqueue(record);
        AimOutcome::Queued(params)
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.scheduler.tick(&mut self.table)
    }
}
