//! # cue_core - Billiards Shot Replay Engine
//!
//! Replays shots solved by an external physics engine. The solver reports a
//! sparse, per-ball list of regime changes; this crate fills in the motion
//! between them with closed-form friction kinematics and plays shots back
//! against a wall clock.
//!
//! ## Features
//! - Stateless reconstruction: any query time, any order, same answer
//! - Sliding / rolling / spinning friction model shared by replay and the
//!   free-running stepper
//! - FIFO shot playback with speed control and one-shot completion handlers
//! - Game sessions, turn-history replay and shot-tree aiming on top of playback
//!
//! ## Usage
//! ```rust
//! use cue_core::engine::{BallNumber, BallPlacement, BallRegime, Table, TableConfig};
//! use cue_core::playback::{ManualClock, ShotScheduler, TickOutcome};
//! use nalgebra::Vector2;
//!
//! let mut table = Table::from_positions(
//!     TableConfig::default(),
//!     &[BallPlacement::new(BallNumber::CUE, Vector2::new(0.5, 0.5), BallRegime::Stationary)],
//! );
//! let mut scheduler = ShotScheduler::new(ManualClock::new());
//! assert_eq!(scheduler.tick(&mut table), TickOutcome::Idle);
//! ```

// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]
// Comparisons written as `!(x > 0.0)` reject NaN on purpose
#![allow(clippy::neg_cmp_op_on_partial_ord)]

pub mod engine;
pub mod error;
pub mod models;
pub mod playback;
pub mod session;

pub use error::{CoreError, Result};

// Re-export the replay path
pub use engine::{
    reconstruct, snap_to_final, BallMotionState, BallNumber, BallRegime, CueConfig, FrictionParams,
    FrictionStepper, MotionEvent, Table, TableConfig,
};
pub use models::{GameTurn, ShotParams, ShotRecord, ShotTree};
pub use playback::{Clock, ManualClock, ShotScheduler, SystemClock, TickOutcome};
pub use session::{GameSession, ShotDecider, ShotSolver, ShotTreeViewer, TurnHistoryPlayer};

/// Crate version, for CLI banners.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
