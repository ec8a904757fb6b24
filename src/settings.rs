//! Game settings and preferences
//!
//! Persisted as part of the game snapshot so a restored game plays on the
//! same table it was saved on.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::puck::{Player, PuckColor};

/// Puck size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PuckSize {
    #[default]
    Medium,
    Large,
}

impl PuckSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            PuckSize::Medium => "Medium",
            PuckSize::Large => "Large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "medium" | "med" => Some(PuckSize::Medium),
            "large" => Some(PuckSize::Large),
            _ => None,
        }
    }

    /// Diameter in inches
    pub fn diameter(&self) -> f32 {
        match self {
            PuckSize::Medium => PUCK_MEDIUM_IN,
            PuckSize::Large => PUCK_LARGE_IN,
        }
    }
}

/// Table, puck and scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Table length in feet (regulation range, clamped on load)
    pub length_ft: u32,
    /// Puck diameter in inches
    pub puck_diameter: f32,
    /// Cumulative score that ends the game
    pub target_score: u32,
    /// Award 4 points for a puck hanging over the far edge
    pub edging_enabled: bool,
    pub p1_color: PuckColor,
    pub p2_color: PuckColor,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            length_ft: DEFAULT_LENGTH_FT,
            puck_diameter: PUCK_MEDIUM_IN,
            target_score: DEFAULT_TARGET_SCORE,
            edging_enabled: true,
            p1_color: PuckColor::Red,
            p2_color: PuckColor::Blue,
        }
    }
}

impl Settings {
    /// Puck color for a player
    pub fn color(&self, player: Player) -> PuckColor {
        match player {
            Player::P1 => self.p1_color,
            Player::P2 => self.p2_color,
        }
    }

    pub fn set_puck_size(&mut self, size: PuckSize) {
        self.puck_diameter = size.diameter();
    }

    /// Clamp loaded values back into their legal ranges. Snapshot files are
    /// user-editable, so never trust them blindly.
    pub fn sanitized(mut self) -> Self {
        self.length_ft = self.length_ft.clamp(MIN_LENGTH_FT, MAX_LENGTH_FT);
        if self.puck_diameter != PUCK_MEDIUM_IN && self.puck_diameter != PUCK_LARGE_IN {
            self.puck_diameter = PUCK_MEDIUM_IN;
        }
        self.target_score = self.target_score.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_regulation() {
        let s = Settings::default();
        assert_eq!(s.length_ft, 9);
        assert_eq!(s.puck_diameter, PUCK_MEDIUM_IN);
        assert_eq!(s.target_score, 21);
        assert!(s.edging_enabled);
    }

    #[test]
    fn test_sanitize_clamps_hand_edited_values() {
        let s = Settings {
            length_ft: 99,
            puck_diameter: 7.5,
            target_score: 0,
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(s.length_ft, MAX_LENGTH_FT);
        assert_eq!(s.puck_diameter, PUCK_MEDIUM_IN);
        assert_eq!(s.target_score, 1);
    }

    #[test]
    fn test_size_preset_round_trip() {
        let mut s = Settings::default();
        s.set_puck_size(PuckSize::Large);
        assert_eq!(s.puck_diameter, PUCK_LARGE_IN);
        assert_eq!(PuckSize::from_str("large"), Some(PuckSize::Large));
        assert_eq!(PuckSize::from_str("giant"), None);
    }
}
