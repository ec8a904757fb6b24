//! Table geometry in real-world inches
//!
//! An explicit immutable value passed to every component that needs spatial
//! reasoning. Pixel mapping lives entirely at the rendering boundary and is
//! never consulted here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned rectangle in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Closest point on (or inside) the rectangle to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Immutable spatial configuration for one round.
///
/// Origin is the top-left corner of the play surface; x grows down-table
/// toward the far end, y grows across the table width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableGeometry {
    /// Table length in feet (9-22)
    pub length_ft: u32,
}

impl TableGeometry {
    pub fn new(length_ft: u32) -> Self {
        Self {
            length_ft: length_ft.clamp(MIN_LENGTH_FT, MAX_LENGTH_FT),
        }
    }

    /// Play surface length in inches
    pub fn length_in(&self) -> f32 {
        (self.length_ft * 12) as f32
    }

    /// The play surface footprint: `(0,0)` to `(length, 20)`
    pub fn play_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.length_in(), TABLE_WIDTH_IN)
    }

    /// Throw line x: a legal release must stay behind this
    pub fn throw_line_in(&self) -> f32 {
        THROW_LINE_FT * 12.0
    }

    /// Foul line x: a counted puck must cross this to stay in play
    pub fn foul_line_in(&self) -> f32 {
        self.length_in() - FOUL_LINE_FT * 12.0
    }

    /// Play surface past the throw line; a staged puck must stay out of it
    pub fn beyond_throw_line_rect(&self) -> Rect {
        Rect::new(self.throw_line_in(), 0.0, self.length_in(), TABLE_WIDTH_IN)
    }

    /// The full frame: holding-area strips around the play surface
    pub fn outer_rect(&self) -> Rect {
        Rect::new(
            -GUTTER_LEFT_IN,
            -GUTTER_Y_IN,
            self.length_in() + GUTTER_RIGHT_IN,
            TABLE_WIDTH_IN + GUTTER_Y_IN,
        )
    }

    /// The shooter-side holding strip where fresh pucks are scattered
    pub fn scatter_rect(&self) -> Rect {
        Rect::new(
            -GUTTER_LEFT_IN,
            -GUTTER_Y_IN,
            0.0,
            TABLE_WIDTH_IN + GUTTER_Y_IN,
        )
    }
}
