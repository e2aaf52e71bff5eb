pub mod ball;
pub mod config;
pub mod kinematics;
pub mod layout;
pub mod physics_constants;
pub mod rack;
pub mod reconstruct;
pub mod stepper; // free-running path, no solver events
pub mod table;
pub mod timeline;

pub use ball::{BallAppearance, BallMotionState, BallNumber, BallRegime, GameBall, BALL_COLORS};
pub use config::{CueConfig, PlaybackConfig, TableConfig};
pub use kinematics::FrictionParams;
pub use layout::{Pocket, TableLayout};
pub use rack::{eight_ball_rack, one_ball_table, two_ball_table};
pub use reconstruct::{advance_event, reconstruct, sample, snap_to_final};
pub use stepper::{derive_regime, FrictionStepper};
pub use table::{BallPlacement, Table};
pub use timeline::{BallTimeline, EventCause, MotionEvent, Segment};
