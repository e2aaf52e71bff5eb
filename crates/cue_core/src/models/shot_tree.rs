//! Shot trees: chains of planned shots drawn as ghost balls joined by lines.
//!
//! Nodes live in an arena and link forward by index. Walking is iterative
//! and visits at most `nodes.len()` nodes, so a malformed chain with a cycle
//! still terminates.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::shot::ShotParams;
use crate::engine::kinematics::is_negligible;

/// Perpendicular offset of a link's id label from the link midpoint, in
/// table units before scaling.
pub const LABEL_OFFSET: f64 = 0.08;

/// Cue elevation for aimed shots (degrees).
pub const AIM_ELEVATION_DEG: f64 = 11.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotTreeNode {
    pub id: u32,
    /// Leftmost contact point of the shot corridor
    pub left_most: Vector2<f64>,
    /// Rightmost contact point of the shot corridor
    pub right_most: Vector2<f64>,
    /// Cue ball position at contact
    pub ghost_ball: Vector2<f64>,
    /// Cue ball position before the stroke
    pub cue_ball: Vector2<f64>,
    /// Arena index of the follow-up shot
    #[serde(default)]
    pub next: Option<usize>,
}

impl ShotTreeNode {
    /// Azimuth that sends the cue ball from `cue_ball` to `ghost_ball`, in
    /// the solver's convention: straight up the table is 270, toward +x is
    /// 180. `None` when the two points coincide.
    pub fn aim_phi(&self) -> Option<f64> {
        let d = self.ghost_ball - self.cue_ball;
        if is_negligible(d.norm()) {
            return None;
        }
        Some((d.y.atan2(d.x).to_degrees() + 180.0).rem_euclid(360.0))
    }

    /// Centre-ball stroke at `speed` toward the ghost ball.
    pub fn aim(&self, speed: f64) -> Option<ShotParams> {
        self.aim_phi().map(|phi| ShotParams::new(speed, 0.0, 0.0, AIM_ELEVATION_DEG, phi))
    }
}

/// Lines drawn between a node and its successor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotLink {
    pub from: usize,
    pub to: usize,
    /// `right_most` of `from` to `left_most` of `to`
    pub right_to_left: (Vector2<f64>, Vector2<f64>),
    /// `left_most` of `from` to `right_most` of `to`
    pub left_to_right: (Vector2<f64>, Vector2<f64>),
    /// Where the successor's id is written
    pub label_anchor: Vector2<f64>,
    pub label: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShotTree {
    pub nodes: Vec<ShotTreeNode>,
    #[serde(default)]
    pub root: usize,
}

impl ShotTree {
    pub fn new(nodes: Vec<ShotTreeNode>, root: usize) -> Self {
        Self { nodes, root }
    }

    /// Link `nodes` in order: each node's `next` is the one after it.
    pub fn from_chain(nodes: impl IntoIterator<Item = ShotTreeNode>) -> Self {
        let mut nodes: Vec<ShotTreeNode> = nodes.into_iter().collect();
        let n = nodes.len();
        for (i, node) in nodes.iter_mut().enumerate() {
            node.next = (i + 1 < n).then_some(i + 1);
        }
        Self { nodes, root: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, index: usize) -> Option<&ShotTreeNode> {
        self.nodes.get(index)
    }

    /// The first shot of the chain, the one that gets played.
    pub fn root_node(&self) -> Option<&ShotTreeNode> {
        self.nodes.get(self.root)
    }

    /// Arena indices from `root` along `next`.
    pub fn walk(&self) -> Vec<usize> {
        self.walk_from(self.root)
    }

    pub fn walk_from(&self, start: usize) -> Vec<usize> {
        let mut visited = Vec::new();
        let mut current = Some(start);
        while let Some(index) = current {
            if index >= self.nodes.len() || visited.len() >= self.nodes.len() {
                break;
            }
            visited.push(index);
            current = self.nodes[index].next;
        }
        visited
    }

    /// Every link along the walk, in walk order.
    pub fn links(&self) -> Vec<ShotLink> {
        let path = self.walk();
        path.iter()
            .filter_map(|&from| {
                let node = &self.nodes[from];
                let to = node.next?;
                let next = self.nodes.get(to)?;
                Some(ShotLink {
                    from,
                    to,
                    right_to_left: (node.right_most, next.left_most),
                    left_to_right: (node.left_most, next.right_most),
                    label_anchor: label_anchor(node.ghost_ball, next.ghost_ball),
                    label: next.id,
                })
            })
            .collect()
    }
}

/// Midpoint between two ghost balls, pushed sideways so the label does not
/// sit on the lines. The push is perpendicular to the midpoint's position
/// vector; a midpoint at the origin stays put.
pub fn label_anchor(from: Vector2<f64>, to: Vector2<f64>) -> Vector2<f64> {
    let mid = from + (to - from) / 2.0;
    let mag = mid.norm();
    if mag == 0.0 {
        return mid;
    }
    mid + Vector2::new(mid.y, -mid.x) / mag * LABEL_OFFSET
}

/// Cycles through a list of trees, wrapping at both ends.
#[derive(Debug, Clone, Default)]
pub struct ShotTreeBrowser {
    trees: Vec<ShotTree>,
    active: usize,
}

impl ShotTreeBrowser {
    pub fn new(trees: Vec<ShotTree>) -> Self {
        Self { trees, active: 0 }
    }

    /// Replace the list and go back to the first tree.
    pub fn replace(&mut self, trees: Vec<ShotTree>) {
        self.trees = trees;
        self.active = 0;
    }

    pub fn active(&self) -> Option<&ShotTree> {
        self.trees.get(self.active)
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn next(&mut self) -> Option<&ShotTree> {
        if !self.trees.is_empty() {
            self.active = (self.active + 1) % self.trees.len();
        }
        self.active()
    }

    pub fn previous(&mut self) -> Option<&ShotTree> {
        if !self.trees.is_empty() {
            self.active = (self.active + self.trees.len() - 1) % self.trees.len();
        }
        self.active()
    }
}
