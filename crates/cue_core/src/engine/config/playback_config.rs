//! Playback pacing

use serde::{Deserialize, Serialize};

use crate::engine::physics_constants::playback;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Shot seconds per wall-clock second (default: 1.0)
    pub speed_factor: f64,
    /// Render ticks per second (default: 60)
    pub frames_per_second: u32,
    /// Ask for the next shot whenever the queue runs dry (default: false)
    pub auto_play: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed_factor: playback::DEFAULT_SPEED_FACTOR,
            frames_per_second: playback::DEFAULT_FPS,
            auto_play: false,
        }
    }
}

impl PlaybackConfig {
    /// Wall-clock seconds between ticks.
    pub fn frame_interval(&self) -> f64 {
        1.0 / f64::from(self.frames_per_second.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if !(playback::MIN_SPEED_FACTOR..=playback::MAX_SPEED_FACTOR).contains(&self.speed_factor) {
            return Err(CoreError::InvalidParameter(format!(
                "speed_factor must be within {}..={}, got {}",
                playback::MIN_SPEED_FACTOR,
                playback::MAX_SPEED_FACTOR,
                self.speed_factor
            )));
        }
        if self.frames_per_second == 0 {
            return Err(CoreError::InvalidParameter("frames_per_second must be positive".into()));
        }
        Ok(())
    }
}
