//! Scoring evaluator and cumulative scoreboard
//!
//! Round points are winner-take-all: only the player owning the furthest
//! puck scores, counting their unbroken run of leading pucks. Recomputed
//! live every tick from the current layout; committed once per round.

use serde::{Deserialize, Serialize};

use super::geometry::TableGeometry;
use super::puck::{Player, Puck, PuckState};
use crate::consts::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Cumulative scores, indexed by [`Player::idx`]
    pub scores: [u32; 2],
    /// Live points for the round in progress
    pub round_points: [u32; 2],
    pub game_winner: Option<Player>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn score(&self, player: Player) -> u32 {
        self.scores[player.idx()]
    }

    /// Recompute live round points from the current puck layout.
    ///
    /// Eligible pucks are those overlapping the play surface in a counted
    /// state; after game over a held puck counts too so free-play scores
    /// track the drag.
    pub fn calculate_points(
        &mut self,
        pucks: &[Puck],
        geom: &TableGeometry,
        edging_enabled: bool,
        game_over: bool,
    ) {
        self.round_points = [0, 0];

        let mut valid: Vec<&Puck> = pucks
            .iter()
            .filter(|p| p.touching_play_area(geom))
            .filter(|p| match p.state {
                PuckState::Thrown | PuckState::OnBoard => true,
                PuckState::Selected => game_over,
                _ => false,
            })
            .collect();

        if valid.is_empty() {
            return;
        }

        // Furthest down-table scores highest
        valid.sort_by(|a, b| b.pos.x.partial_cmp(&a.pos.x).unwrap_or(std::cmp::Ordering::Equal));

        // A contested tie at the lead cancels scoring entirely
        let leader = valid[0];
        if valid.len() > 1 && valid[1].pos.x == leader.pos.x && valid[1].owner != leader.owner {
            return;
        }

        let owner = leader.owner;
        let nearest_opponent_x = valid
            .iter()
            .find(|p| p.owner != owner)
            .map(|p| p.pos.x);

        let length = geom.length_in();
        let mut pts = 0u32;
        for p in &valid {
            if p.owner != owner {
                break;
            }
            // Tied with the nearest opponent puck: disqualified, walk continues
            if nearest_opponent_x == Some(p.pos.x) {
                continue;
            }
            pts += band_points(p, length, edging_enabled);
        }

        self.round_points[owner.idx()] = pts;
    }

    /// Commit the round: add round points to cumulative scores and decide
    /// whether the game is over. Returns the round winner (the player who
    /// scored, if any) and the game-over flag.
    pub fn commit_round(&mut self, target_score: u32) -> (Option<Player>, bool) {
        if let Some(winner) = self.game_winner {
            return (Some(winner), true);
        }

        self.scores[0] += self.round_points[0];
        self.scores[1] += self.round_points[1];

        let round_winner = if self.round_points[Player::P2.idx()] > 0 {
            Some(Player::P2)
        } else if self.round_points[Player::P1.idx()] > 0 {
            Some(Player::P1)
        } else {
            None
        };
        self.round_points = [0, 0];

        let [p1, p2] = self.scores;
        if (p1 >= target_score || p2 >= target_score) && p1 != p2 {
            let winner = if p1 > p2 { Player::P1 } else { Player::P2 };
            self.game_winner = Some(winner);
            return (Some(winner), true);
        }

        (round_winner, false)
    }
}

/// Distance-banded point value for one puck.
///
/// The band is picked by how much table is left between the puck's trailing
/// edge and the far end; a puck overhanging the far end scores the edging
/// bonus instead when enabled.
fn band_points(puck: &Puck, length_in: f32, edging_enabled: bool) -> u32 {
    let left_edge = (length_in - puck.pos.x) + puck.radius;
    let is_edging = puck.pos.x + puck.radius > length_in;

    if edging_enabled && is_edging {
        4
    } else if left_edge < BAND_3PT_IN {
        3
    } else if left_edge < BAND_2PT_IN {
        2
    } else if left_edge < BAND_1PT_IN {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::puck::PuckColor;
    use glam::Vec2;

    const LEN: f32 = 108.0; // 9 ft table

    fn board_puck(id: u32, owner: Player, x: f32) -> Puck {
        let mut p = Puck::new(id, owner, PUCK_MEDIUM_IN, PuckColor::Red);
        p.pos = Vec2::new(x, 10.0);
        p.state = PuckState::OnBoard;
        p
    }

    fn points(pucks: &[Puck], edging: bool, game_over: bool) -> [u32; 2] {
        let geom = TableGeometry::new(9);
        let mut sb = Scoreboard::new();
        sb.calculate_points(pucks, &geom, edging, game_over);
        sb.round_points
    }

    #[test]
    fn test_no_eligible_pucks_scores_zero() {
        let mut p = board_puck(1, Player::P1, 50.0);
        p.state = PuckState::Gutter;
        assert_eq!(points(&[p], true, false), [0, 0]);
    }

    #[test]
    fn test_banded_scoring_single_puck() {
        let r = PUCK_MEDIUM_IN / 2.0;
        // left_edge = 5 in -> 3 pts
        let p = board_puck(1, Player::P1, LEN - 5.0 + r);
        assert_eq!(points(&[p], false, false), [3, 0]);
        // left_edge = 70 in -> 1 pt
        let p = board_puck(1, Player::P1, LEN - 70.0 + r);
        assert_eq!(points(&[p], false, false), [1, 0]);
        // left_edge = 100 in -> 0 pts (behind the 1-point band)
        let p = board_puck(1, Player::P1, LEN - 100.0 + r);
        assert_eq!(points(&[p], false, false), [0, 0]);
    }

    #[test]
    fn test_edging_bonus_beats_band() {
        let r = PUCK_MEDIUM_IN / 2.0;
        let hanging = board_puck(1, Player::P2, LEN - r * 0.5);
        assert_eq!(points(&[hanging.clone()], true, false), [0, 4]);
        // Same puck without the bonus falls back to the 3-point band
        assert_eq!(points(&[hanging], false, false), [0, 3]);
    }

    #[test]
    fn test_tie_at_lead_cancels_scoring() {
        let a = board_puck(1, Player::P1, 104.0);
        let b = board_puck(2, Player::P2, 104.0);
        assert_eq!(points(&[a, b], true, false), [0, 0]);
    }

    #[test]
    fn test_walk_stops_at_first_opponent_puck() {
        let pucks = [
            board_puck(1, Player::P1, 105.0), // 3 pts
            board_puck(2, Player::P1, 100.0), // 2 pts
            board_puck(3, Player::P2, 98.0),  // blocks the rest
            board_puck(4, Player::P1, 97.0),  // not counted
        ];
        assert_eq!(points(&pucks, false, false), [5, 0]);
    }

    #[test]
    fn test_leader_puck_tied_with_opponent_is_skipped() {
        let pucks = [
            board_puck(1, Player::P1, 105.0), // 3 pts
            board_puck(2, Player::P1, 100.0), // tied with opponent: skipped
            board_puck(3, Player::P2, 100.0),
        ];
        assert_eq!(points(&pucks, false, false), [3, 0]);
    }

    #[test]
    fn test_selected_puck_counts_only_after_game_over() {
        let mut p = board_puck(1, Player::P1, 105.0);
        p.state = PuckState::Selected;
        assert_eq!(points(&[p.clone()], false, false), [0, 0]);
        assert_eq!(points(&[p], false, true), [3, 0]);
    }

    #[test]
    fn test_commit_round_reaching_target_ends_game() {
        let mut sb = Scoreboard::new();
        sb.scores = [19, 10];
        sb.round_points = [3, 0];
        let (winner, over) = sb.commit_round(21);
        assert_eq!(sb.score(Player::P1), 22);
        assert!(over);
        assert_eq!(winner, Some(Player::P1));
        assert_eq!(sb.game_winner, Some(Player::P1));
    }

    #[test]
    fn test_commit_round_tied_at_target_continues() {
        let mut sb = Scoreboard::new();
        sb.scores = [19, 21];
        sb.round_points = [2, 0];
        let (winner, over) = sb.commit_round(21);
        assert!(!over);
        assert_eq!(winner, Some(Player::P1));
        assert_eq!(sb.game_winner, None);
    }

    #[test]
    fn test_commit_scoreless_round_has_no_winner() {
        let mut sb = Scoreboard::new();
        let (winner, over) = sb.commit_round(21);
        assert_eq!(winner, None);
        assert!(!over);
    }
}
