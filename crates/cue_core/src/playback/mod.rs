//! Real-time playback of solved shots.

pub mod clock;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::{CompletionHandler, IdleHandler, PlaybackState, ShotScheduler, TickOutcome};
