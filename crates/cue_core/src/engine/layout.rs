//! Frame geometry around the playing surface.
//!
//! Ball positions live in surface coordinates: origin at the SW corner of
//! the cloth, x across the width, y along the length. Drawing happens in
//! frame coordinates, which add the wood border and the rails on every side.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::config::TableConfig;
use super::physics_constants::table;

/// Pocket identifiers in the solver's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pocket {
    Sw,
    W,
    Nw,
    Ne,
    E,
    Se,
}

impl Pocket {
    pub const ALL: [Pocket; 6] = [Pocket::Sw, Pocket::W, Pocket::Nw, Pocket::Ne, Pocket::E, Pocket::Se];

    pub fn is_side(self) -> bool {
        matches!(self, Pocket::W | Pocket::E)
    }

    pub fn label(self) -> &'static str {
        match self {
            Pocket::Sw => "SW",
            Pocket::W => "W",
            Pocket::Nw => "NW",
            Pocket::Ne => "NE",
            Pocket::E => "E",
            Pocket::Se => "SE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableLayout {
    /// Playing surface width
    pub board_width: f64,
    /// Playing surface length
    pub board_length: f64,
    pub wood_width: f64,
    pub rail_width: f64,
    /// Overall frame width
    pub width: f64,
    /// Overall frame length
    pub length: f64,
    /// Offset of the surface origin inside the frame (both axes)
    pub board_offset: f64,
    pub side_pocket_width: f64,
    pub corner_pocket_width: f64,
}

impl TableLayout {
    pub fn new(config: &TableConfig) -> Self {
        let wood_width = config.width * table::WOOD_FRACTION;
        let rail_width = config.width * table::RAIL_FRACTION;
        let border = 2.0 * wood_width + 2.0 * rail_width;
        Self {
            board_width: config.width,
            board_length: config.length,
            wood_width,
            rail_width,
            width: config.width + border,
            length: config.length + border,
            board_offset: wood_width + rail_width,
            side_pocket_width: config.side_pocket_width,
            corner_pocket_width: config.corner_pocket_width,
        }
    }

    /// Surface coordinates to frame coordinates.
    pub fn to_frame(&self, surface: Vector2<f64>) -> Vector2<f64> {
        surface + Vector2::repeat(self.board_offset)
    }

    /// Frame coordinates to surface coordinates (pointer input).
    pub fn to_surface(&self, frame: Vector2<f64>) -> Vector2<f64> {
        frame - Vector2::repeat(self.board_offset)
    }

    pub fn contains_surface_point(&self, p: Vector2<f64>) -> bool {
        (0.0..=self.board_width).contains(&p.x) && (0.0..=self.board_length).contains(&p.y)
    }

    /// Mouths of the six pockets on the surface edge, in [`Pocket::ALL`] order.
    pub fn pocket_centers(&self) -> [(Pocket, Vector2<f64>); 6] {
        let (w, l) = (self.board_width, self.board_length);
        [
            (Pocket::Sw, Vector2::new(0.0, 0.0)),
            (Pocket::W, Vector2::new(0.0, l / 2.0)),
            (Pocket::Nw, Vector2::new(0.0, l)),
            (Pocket::Ne, Vector2::new(w, l)),
            (Pocket::E, Vector2::new(w, l / 2.0)),
            (Pocket::Se, Vector2::new(w, 0.0)),
        ]
    }

    pub fn pocket_width(&self, pocket: Pocket) -> f64 {
        if pocket.is_side() {
            self.side_pocket_width
        } else {
            self.corner_pocket_width
        }
    }

    /// Frame size in pixels at `scaling` pixels per metre, swapped for
    /// horizontal display.
    pub fn canvas_size(&self, scaling: f64, horizontal: bool) -> (u32, u32) {
        let w = (self.width * scaling) as u32;
        let l = (self.length * scaling) as u32;
        if horizontal {
            (l, w)
        } else {
            (w, l)
        }
    }
}

impl From<&TableConfig> for TableLayout {
    fn from(config: &TableConfig) -> Self {
        Self::new(config)
    }
}
