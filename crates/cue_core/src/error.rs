use thiserror::Error;

use crate::engine::ball::BallNumber;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid ball number: {0}")]
    InvalidBallNumber(u8),

    #[error("Unknown ball regime code: {0}")]
    InvalidRegime(u8),

    #[error("Timeline for ball {ball} is not time-ordered at event {index}")]
    UnorderedTimeline { ball: BallNumber, index: usize },

    #[error("Duplicate timeline for ball {0}")]
    DuplicateTimeline(BallNumber),

    #[error("Ball {0} cannot be placed while out of play")]
    BallNotPlaceable(BallNumber),

    #[error("No games provided")]
    NoGames,

    #[error("Games must share table dimensions: {0}")]
    TableMismatch(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

impl CoreError {
    /// Errors caused by caller-supplied data rather than the environment.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, CoreError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
