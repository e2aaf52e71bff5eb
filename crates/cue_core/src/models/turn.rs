//! Recorded turns of a finished game, as kept by a game server for replay.

use serde::{Deserialize, Serialize};

use super::shot::ShotParams;
use crate::engine::ball::BallNumber;
use crate::engine::layout::Pocket;
use crate::engine::table::BallPlacement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnType {
    #[default]
    Normal,
    Break,
    BallInHand,
    BehindLine,
}

/// What the player chose to do before the stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDecision {
    #[default]
    NoDecision,
    KeepShooting,
    Rerack,
    BreakBallInHand,
    Concede,
}

/// Ball and pocket the player called for this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnHighlight {
    pub ball: Option<BallNumber>,
    pub pocket: Option<Pocket>,
}

/// One turn: the table before the stroke and the stroke the player asked for.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameTurn {
    #[serde(default)]
    pub agent: String,

    #[serde(default)]
    pub turn_type: TurnType,

    #[serde(default)]
    pub decision: TurnDecision,

    /// Result reported by the referee, e.g. "ok" or "foul"
    #[serde(default)]
    pub result: String,

    pub params: ShotParams,

    #[serde(default)]
    pub ball_target: Option<BallNumber>,

    #[serde(default)]
    pub pocket_target: Option<Pocket>,

    pub table_before: Vec<BallPlacement>,
}

impl GameTurn {
    pub fn is_concede(&self) -> bool {
        self.decision == TurnDecision::Concede
    }

    /// Called ball and pocket. A break has no call.
    pub fn highlight(&self) -> TurnHighlight {
        if self.turn_type == TurnType::Break {
            return TurnHighlight::default();
        }
        TurnHighlight { ball: self.ball_target, pocket: self.pocket_target }
    }
}
