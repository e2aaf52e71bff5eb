//! Shot playback scheduler.
//!
//! Queued shots are played one at a time against a [`Table`]. Every tick
//! recomputes the scaled elapsed time of the active shot from the clock and
//! reconstructs all balls at that time; once the elapsed time passes the
//! shot's duration the balls are snapped to their final states and the
//! shot's completion handler runs.
//!
//! ```text
//! Idle --(queue non-empty)--> Playing --(elapsed > duration)--> Idle
//!   ^                            |
//!   +------(cancel_active)-------+
//! ```

use std::collections::VecDeque;
use std::fmt;

use super::clock::Clock;
use crate::engine::config::PlaybackConfig;
use crate::engine::physics_constants::playback;
use crate::engine::table::Table;
use crate::models::shot::ShotRecord;

/// Runs once when a shot finishes playing.
pub type CompletionHandler = Box<dyn FnOnce()>;

/// Runs on ticks where nothing is queued.
pub type IdleHandler = Box<dyn FnMut()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing queued
    Idle,
    /// A queued shot was started and its first frame drawn
    Started { elapsed: f64 },
    Playing { elapsed: f64 },
    /// The active shot ended; balls are at their final states
    Completed,
}

struct QueuedShot {
    record: ShotRecord,
    on_complete: Option<CompletionHandler>,
}

/// Active shot and its time base. Scaled elapsed time is
/// `base_elapsed + (now - rebased_at) * speed_factor`; the base moves only
/// when the speed factor changes, so a speed change never makes the shot
/// jump.
struct ActiveShot {
    shot: QueuedShot,
    started_at: f64,
    rebased_at: f64,
    base_elapsed: f64,
}

pub struct ShotScheduler<C: Clock> {
    clock: C,
    queue: VecDeque<QueuedShot>,
    active: Option<ActiveShot>,
    speed_factor: f64,
    on_idle: Option<IdleHandler>,
    completed: u64,
}

impl<C: Clock> ShotScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            queue: VecDeque::new(),
            active: None,
            speed_factor: playback::DEFAULT_SPEED_FACTOR,
            on_idle: None,
            completed: 0,
        }
    }

    pub fn with_config(clock: C, config: &PlaybackConfig) -> Self {
        let mut scheduler = Self::new(clock);
        scheduler.set_speed_factor(config.speed_factor);
        scheduler
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn state(&self) -> PlaybackState {
        if self.active.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Shots that played to the end since construction.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    pub fn active_shot(&self) -> Option<&ShotRecord> {
        self.active.as_ref().map(|a| &a.shot.record)
    }

    /// Scaled seconds into the active shot.
    pub fn elapsed(&self) -> Option<f64> {
        let now = self.clock.now();
        self.active.as_ref().map(|a| self.elapsed_at(a, now))
    }

    fn elapsed_at(&self, active: &ActiveShot, now: f64) -> f64 {
        active.base_elapsed + (now - active.rebased_at).max(0.0) * self.speed_factor
    }

    /// Change playback speed. Takes effect from now on: the scaled time
    /// already played is kept. Out-of-range values are clamped.
    pub fn set_speed_factor(&mut self, factor: f64) {
        let clamped = if factor.is_finite() {
            factor.clamp(playback::MIN_SPEED_FACTOR, playback::MAX_SPEED_FACTOR)
        } else {
            playback::DEFAULT_SPEED_FACTOR
        };
        if clamped != factor {
            log::warn!("speed factor {} out of range, using {}", factor, clamped);
        }

        let now = self.clock.now();
        if let Some(active) = self.active.as_ref() {
            let elapsed = self.elapsed_at(active, now);
            if let Some(active) = self.active.as_mut() {
                active.base_elapsed = elapsed;
                active.rebased_at = now;
            }
        }
        self.speed_factor = clamped;
    }

    pub fn set_idle_handler(&mut self, handler: impl FnMut() + 'static) {
        self.on_idle = Some(Box::new(handler));
    }

    pub fn clear_idle_handler(&mut self) {
        self.on_idle = None;
    }

    pub fn enqueue(&mut self, record: ShotRecord) {
        self.push(record, None);
    }

    /// Queue a shot with a handler that runs when it has finished playing.
    /// The handler never runs if the shot is cancelled.
    pub fn enqueue_with(&mut self, record: ShotRecord, on_complete: impl FnOnce() + 'static) {
        self.push(record, Some(Box::new(on_complete)));
    }

    fn push(&mut self, record: ShotRecord, on_complete: Option<CompletionHandler>) {
        log::debug!(
            "queued shot ({:.3}s, {} events), {} waiting",
            record.duration,
            record.event_count(),
            self.queue.len() + 1
        );
        self.queue.push_back(QueuedShot { record, on_complete });
    }

    /// Drop the active shot without running its completion handler. Balls
    /// keep whatever state the last frame gave them. Returns whether a shot
    /// was playing.
    pub fn cancel_active(&mut self) -> bool {
        let now = self.clock.now();
        match self.active.take() {
            Some(active) => {
                log::info!("shot cancelled at {:.3}s", self.elapsed_at(&active, now));
                true
            }
            None => false,
        }
    }

    /// Cancel the active shot and drop everything queued.
    pub fn clear(&mut self) {
        self.cancel_active();
        if !self.queue.is_empty() {
            log::debug!("dropped {} queued shots", self.queue.len());
        }
        self.queue.clear();
    }

    /// Advance playback by one frame.
    pub fn tick(&mut self, table: &mut Table) -> TickOutcome {
        let now = self.clock.now();

        let started = if self.active.is_none() {
            match self.queue.pop_front() {
                Some(shot) => {
                    log::info!(
                        "playing shot: v={:.2} phi={:.1} duration={:.3}s",
                        shot.record.params.v,
                        shot.record.params.phi,
                        shot.record.duration
                    );
                    self.active = Some(ActiveShot { shot, started_at: now, rebased_at: now, base_elapsed: 0.0 });
                    true
                }
                None => {
                    if let Some(on_idle) = self.on_idle.as_mut() {
                        on_idle();
                    }
                    return TickOutcome::Idle;
                }
            }
        } else {
            false
        };

        let Some(active) = self.active.as_ref() else {
            return TickOutcome::Idle;
        };
        let elapsed = self.elapsed_at(active, now);

        if elapsed > active.shot.record.duration {
            return self.finish(table, now);
        }

        table.apply_shot_at(&active.shot.record, elapsed);
        log::trace!("frame at {:.4}s", elapsed);

        if started {
            TickOutcome::Started { elapsed }
        } else {
            TickOutcome::Playing { elapsed }
        }
    }

    fn finish(&mut self, table: &mut Table, now: f64) -> TickOutcome {
        let Some(active) = self.active.take() else {
            return TickOutcome::Idle;
        };
        table.snap_to_end(&active.shot.record);
        self.completed += 1;
        log::info!(
            "shot finished after {:.3}s wall time, {} queued",
            now - active.started_at,
            self.queue.len()
        );
        if let Some(on_complete) = active.shot.on_complete {
            on_complete();
        }
        TickOutcome::Completed
    }
}

impl<C: Clock> fmt::Debug for ShotScheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShotScheduler")
            .field("state", &self.state())
            .field("queued", &self.queue.len())
            .field("speed_factor", &self.speed_factor)
            .field("completed", &self.completed)
            .finish()
    }
}
