pub mod shot;
pub mod shot_tree;
pub mod turn;

pub use shot::{BallSnapshot, ShotParams, ShotRecord, SolverEvent};
pub use shot_tree::{label_anchor, ShotLink, ShotTree, ShotTreeBrowser, ShotTreeNode};
pub use turn::{GameTurn, TurnDecision, TurnHighlight, TurnType};
