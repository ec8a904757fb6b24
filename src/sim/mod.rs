//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, pairs by index)
//! - No rendering or platform dependencies
//!
//! Every coordinate is in real-world inches with the origin at the far-left
//! corner of the play surface; x grows toward the far end, y across the table.

pub mod board;
pub mod geometry;
pub mod physics;
pub mod puck;
pub mod score;
pub mod state;
pub mod tick;

pub use board::Gutter;
pub use geometry::{Rect, TableGeometry};
pub use puck::{Player, Puck, PuckColor, PuckState};
pub use score::Scoreboard;
pub use state::{GamePhase, GameState};
pub use tick::{run_until_settled, tick};
