//! Shufflepuck - a two-player table shuffleboard simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (puck physics, turn state machine, scoring)
//! - `settings`: Table/puck/scoring configuration
//! - `persistence`: Save/load of the full game snapshot
//!
//! All simulation coordinates are real-world inches; mapping to pixels is a
//! rendering concern and never enters the core.

pub mod persistence;
pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{GamePhase, GameState, Player, Puck, PuckState, TableGeometry};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;
    /// Position integration sub-steps per tick (reduces tunneling at high speed)
    pub const MOVE_SUBSTEPS: u32 = 8;

    /// Table width (inches)
    pub const TABLE_WIDTH_IN: f32 = 20.0;
    /// Table length limits (feet)
    pub const MIN_LENGTH_FT: u32 = 9;
    pub const MAX_LENGTH_FT: u32 = 22;
    pub const DEFAULT_LENGTH_FT: u32 = 9;
    /// Throw line distance from the shooter's end (feet)
    pub const THROW_LINE_FT: f32 = 3.0;
    /// Foul line distance from the far end (feet)
    pub const FOUL_LINE_FT: f32 = 6.0;

    /// Holding-area margins around the play surface (inches)
    pub const GUTTER_LEFT_IN: f32 = 10.0;
    pub const GUTTER_RIGHT_IN: f32 = 30.0;
    pub const GUTTER_Y_IN: f32 = 4.0;

    /// Puck diameters (inches)
    pub const PUCK_MEDIUM_IN: f32 = 2.125;
    pub const PUCK_LARGE_IN: f32 = 2.3125;

    /// Friction per tick on the play surface
    pub const TABLE_FRICTION: f32 = 0.985;
    /// Friction per tick in the holding area
    pub const GUTTER_FRICTION: f32 = 0.85;
    /// Speed below which a puck snaps to rest (inches/tick)
    pub const MIN_SPEED: f32 = 0.05;
    /// Maximum throw speed (inches/tick)
    pub const MAX_POWER: f32 = 15.0;
    /// Minimum release speed for a throw to count (inches/tick)
    pub const MIN_THROW_SPEED: f32 = 0.5;

    /// Velocity multiplier when bouncing off the outer frame
    pub const WALL_BOUNCE: f32 = -0.6;
    /// Restitution against rectangular obstacles (table/holding-area edges)
    pub const OBSTACLE_RESTITUTION: f32 = 0.7;
    /// Restitution for puck-on-puck elastic collisions
    pub const PUCK_RESTITUTION: f32 = 0.9;
    /// Velocity kick per inch of overlap when shoved by a held puck
    pub const KICK_POWER: f32 = 2.5;
    /// Extra separation margin for static (non-bouncing) resolution
    pub const STATIC_MARGIN: f32 = 0.05;
    /// Off-table tolerance before a settled puck is knocked loose, as a radius fraction
    pub const STABLE_TOLERANCE: f32 = 0.22;

    /// Pucks dealt to each player at round start
    pub const PUCKS_PER_PLAYER: usize = 4;
    /// Default target score (15 is the common alternative)
    pub const DEFAULT_TARGET_SCORE: u32 = 21;

    /// Post-round pause before scores commit (2 seconds at 60 Hz)
    pub const ROUND_OVER_DELAY_TICKS: u32 = 2 * TICK_RATE;

    /// Scoring band edges, measured from the far end (inches)
    pub const BAND_3PT_IN: f32 = 6.0;
    pub const BAND_2PT_IN: f32 = 12.0;
    pub const BAND_1PT_IN: f32 = 72.0;
}
