//! Puck entity and lifecycle state machine

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::TableGeometry;
use crate::consts::*;

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    P1,
    P2,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::P1 => Player::P2,
            Player::P2 => Player::P1,
        }
    }

    /// Index into per-player arrays
    pub fn idx(self) -> usize {
        match self {
            Player::P1 => 0,
            Player::P2 => 1,
        }
    }
}

/// Named puck colors selectable per player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuckColor {
    Red,
    Wine,
    Orange,
    Yellow,
    Lime,
    Green,
    Cyan,
    Blue,
    Purple,
    Pink,
    White,
}

impl PuckColor {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            PuckColor::Red => (240, 30, 20),
            PuckColor::Wine => (120, 0, 30),
            PuckColor::Orange => (220, 110, 0),
            PuckColor::Yellow => (250, 220, 0),
            PuckColor::Lime => (40, 210, 40),
            PuckColor::Green => (0, 110, 20),
            PuckColor::Cyan => (100, 200, 250),
            PuckColor::Blue => (0, 70, 220),
            PuckColor::Purple => (140, 30, 170),
            PuckColor::Pink => (250, 100, 180),
            PuckColor::White => (240, 240, 240),
        }
    }
}

/// Puck lifecycle state (mutually exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuckState {
    /// In the holding area, not in play
    Gutter,
    /// Settled before the foul line, may be picked up again
    Ready,
    /// Held and aimed by a player; exempt from symmetric collision response
    Selected,
    /// Released and settling; counts toward live scoring
    Thrown,
    /// Settled on the play surface past the foul line
    OnBoard,
}

impl PuckState {
    /// States that participate in play-surface physics and scoring zones
    pub fn on_table(self) -> bool {
        matches!(self, PuckState::Thrown | PuckState::OnBoard | PuckState::Ready)
    }

    /// States a player may pick the puck up from
    pub fn selectable(self) -> bool {
        matches!(self, PuckState::Gutter | PuckState::Ready)
    }
}

/// A puck: mutable physical body plus lifecycle state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Puck {
    pub id: u32,
    pub owner: Player,
    /// Physical radius in inches (diameter / 2)
    pub radius: f32,
    pub pos: Vec2,
    /// Velocity in inches/tick
    pub vel: Vec2,
    pub is_moving: bool,
    pub state: PuckState,
    pub color: PuckColor,
    /// Hover feedback for rendering; recomputed every tick
    #[serde(skip)]
    pub highlighted: bool,
}

impl Puck {
    pub fn new(id: u32, owner: Player, diameter: f32, color: PuckColor) -> Self {
        Self {
            id,
            owner,
            radius: diameter / 2.0,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            is_moving: false,
            state: PuckState::Gutter,
            color,
            highlighted: false,
        }
    }

    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Stop dead and drop any motion flags
    pub fn halt(&mut self) {
        self.vel = Vec2::ZERO;
        self.is_moving = false;
    }

    /// Within tolerance of the play surface? A settled puck pushed further
    /// out than 22% of its radius is considered knocked off.
    pub fn stable(&self, geom: &TableGeometry) -> bool {
        let tol = self.radius * STABLE_TOLERANCE;
        let play = geom.play_rect();
        self.pos.x >= play.min.x - tol
            && self.pos.x <= play.max.x + tol
            && self.pos.y >= play.min.y - tol
            && self.pos.y <= play.max.y + tol
    }

    /// Strict containment test used for scoring eligibility: any part of the
    /// puck overlapping the play surface footprint counts.
    pub fn touching_play_area(&self, geom: &TableGeometry) -> bool {
        let play = geom.play_rect();
        !(self.pos.x + self.radius < play.min.x
            || self.pos.x - self.radius > play.max.x
            || self.pos.y + self.radius < play.min.y
            || self.pos.y - self.radius > play.max.y)
    }
}
