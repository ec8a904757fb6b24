//! Game state and the command surface consumed by input/UI layers
//!
//! Holds everything the turn machine, physics pass, and scoring evaluator
//! operate on. Rendering reads the public fields; input drives the command
//! methods. Invalid commands are silent no-ops guarded here.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::Gutter;
use super::geometry::TableGeometry;
use super::puck::{Player, Puck, PuckColor, PuckState};
use super::score::Scoreboard;
use crate::consts::*;
use crate::settings::Settings;

/// Coarse phase of the round in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the current player to select and release a puck
    Aiming,
    /// At least one counted puck is still settling
    Moving,
    /// Both players out of throws; fixed pause before scores commit
    RoundOverDelay,
}

/// Complete game session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub gutter: Gutter,
    pub scoreboard: Scoreboard,
    pub current_turn: Player,
    /// Who throws first next round (last round's scorer)
    pub round_starter: Player,
    /// Throws remaining per player, indexed by [`Player::idx`]
    pub throws_left: [u8; 2],
    pub game_over: bool,
    pub phase: GamePhase,
    /// Ticks left in the post-round pause; meaningful only in
    /// [`GamePhase::RoundOverDelay`]
    pub delay_ticks: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Id of the puck currently held by a player, if any
    pub selected: Option<u32>,
    /// Run seed for reproducible scatter placement
    pub seed: u64,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Fresh game with the given settings and scatter seed
    pub fn new(settings: Settings, seed: u64) -> Self {
        let mut state = Self {
            settings,
            gutter: Gutter::new(),
            scoreboard: Scoreboard::new(),
            current_turn: Player::P1,
            round_starter: Player::P1,
            throws_left: [PUCKS_PER_PLAYER as u8; 2],
            game_over: false,
            phase: GamePhase::Aiming,
            delay_ticks: 0,
            time_ticks: 0,
            selected: None,
            seed,
            rng: Pcg32::seed_from_u64(seed),
        };
        state.start_new_round();
        state
    }

    /// Table geometry for the current settings
    pub fn geometry(&self) -> TableGeometry {
        TableGeometry::new(self.settings.length_ft)
    }

    pub fn throws_remaining(&self, player: Player) -> u8 {
        self.throws_left[player.idx()]
    }

    /// Discard all pucks and deal a fresh round; the round starter throws
    /// first and their pucks render on top of the opponent's.
    pub fn start_new_round(&mut self) {
        self.phase = GamePhase::Aiming;
        self.throws_left = [PUCKS_PER_PLAYER as u8; 2];
        self.game_over = false;
        self.delay_ticks = 0;
        self.selected = None;

        self.gutter.clear();
        self.gutter.free_play = false;
        let first = self.round_starter;
        let second = first.other();
        for _ in 0..PUCKS_PER_PLAYER {
            self.gutter.spawn_puck(
                second,
                self.settings.puck_diameter,
                self.settings.color(second),
            );
            self.gutter.spawn_puck(
                first,
                self.settings.puck_diameter,
                self.settings.color(first),
            );
        }

        let geom = self.geometry();
        self.gutter.scatter(&mut self.rng, &geom);
        self.current_turn = first;
        log::info!(
            "new round: {:?} throws first, {} pucks dealt",
            first,
            self.gutter.pucks.len()
        );
    }

    /// Full reset: scores wiped, player one starts
    pub fn reset_game(&mut self) {
        self.scoreboard.reset();
        self.round_starter = Player::P1;
        self.start_new_round();
        log::info!("game reset");
    }

    /// Apply new settings. A change to the table layout or scoring rules
    /// resets the game (the layout is immutable for a round); a pure color
    /// change just recolors the pucks in place.
    pub fn apply_settings(&mut self, settings: Settings) {
        let layout_changed = settings.length_ft != self.settings.length_ft
            || settings.puck_diameter != self.settings.puck_diameter
            || settings.edging_enabled != self.settings.edging_enabled
            || settings.target_score != self.settings.target_score;

        self.settings = settings;
        if layout_changed {
            self.reset_game();
        } else {
            for p in &mut self.gutter.pucks {
                p.color = self.settings.color(p.owner);
            }
        }
    }

    /// Resize the playable bounds to a new table length (resets the game)
    pub fn resize_table(&mut self, length_ft: u32) {
        let mut settings = self.settings.clone();
        settings.length_ft = length_ft.clamp(MIN_LENGTH_FT, MAX_LENGTH_FT);
        self.apply_settings(settings);
    }

    /// Pick up a puck for aiming. Outside free play only the current player
    /// may lift their own staged pucks, and only with throws remaining.
    /// Returns whether the selection took effect.
    pub fn select_puck(&mut self, id: u32) -> bool {
        if self.phase != GamePhase::Aiming || self.selected.is_some() {
            return false;
        }
        if !self.game_over && self.throws_left[self.current_turn.idx()] == 0 {
            return false;
        }

        let Some(idx) = self.gutter.puck_index(id) else {
            return false;
        };
        let puck = &mut self.gutter.pucks[idx];
        if !puck.state.selectable() {
            return false;
        }
        if !self.game_over && puck.owner != self.current_turn {
            return false;
        }

        puck.state = PuckState::Selected;
        self.selected = Some(id);
        true
    }

    /// Drag the held puck to a new position and resolve drag constraints
    pub fn drag_selected(&mut self, pos: Vec2) {
        let Some(idx) = self.selected.and_then(|id| self.gutter.puck_index(id)) else {
            return;
        };
        self.gutter.pucks[idx].set_pos(pos);
        let geom = self.geometry();
        self.gutter.update_constraints(&geom);
    }

    /// Release the held puck with the given velocity. A release on the play
    /// surface behind the throw line with enough speed becomes a counted
    /// throw; anything else cancels back to a staged state.
    pub fn release_selected(&mut self, vel: Vec2) {
        let Some(id) = self.selected else {
            return;
        };
        let Some(idx) = self.gutter.puck_index(id) else {
            self.selected = None;
            return;
        };

        let geom = self.geometry();
        let puck = &self.gutter.pucks[idx];
        let legal_release =
            geom.play_rect().contains(puck.pos) && puck.pos.x < geom.throw_line_in();

        if legal_release && vel.length() >= MIN_THROW_SPEED {
            self.throw_puck(id, vel, true);
        } else {
            self.cancel_selection();
        }
    }

    /// Put the held puck down without throwing
    pub fn cancel_selection(&mut self) {
        let Some(idx) = self.selected.and_then(|id| self.gutter.puck_index(id)) else {
            self.selected = None;
            return;
        };
        let geom = self.geometry();
        let puck = &mut self.gutter.pucks[idx];
        puck.state = if puck.touching_play_area(&geom) {
            PuckState::Ready
        } else {
            PuckState::Gutter
        };
        self.selected = None;
    }

    /// Launch a puck with the given velocity (inches/tick, clamped to
    /// [`MAX_POWER`]). A counted throw consumes one of the owner's throws
    /// and moves the round into the settling phase; an uncounted throw just
    /// sets the puck in motion.
    pub fn throw_puck(&mut self, id: u32, vel: Vec2, counted: bool) {
        let Some(idx) = self.gutter.puck_index(id) else {
            return;
        };
        let geom = self.geometry();

        let speed = vel.length();
        let vel = if speed > MAX_POWER {
            vel * (MAX_POWER / speed)
        } else {
            vel
        };

        let puck = &mut self.gutter.pucks[idx];
        puck.vel = vel;
        puck.is_moving = true;
        if self.selected == Some(id) {
            self.selected = None;
        }

        if counted {
            puck.state = PuckState::Thrown;
            let owner = puck.owner;
            if !self.game_over && self.throws_left[owner.idx()] > 0 {
                self.throws_left[owner.idx()] -= 1;
            }
            self.phase = GamePhase::Moving;
            log::debug!(
                "{:?} threw puck {} at {:.2} in/tick ({} throws left)",
                owner,
                id,
                vel.length(),
                self.throws_left[owner.idx()]
            );
        } else {
            puck.state = if puck.touching_play_area(&geom) {
                PuckState::Thrown
            } else {
                PuckState::Gutter
            };
        }
    }

    /// Re-scatter pucks that are not in play; after game over, everything
    /// goes back to the holding area.
    pub fn reset_idle_pucks(&mut self) {
        let geom = self.geometry();
        if self.game_over {
            for p in &mut self.gutter.pucks {
                p.state = PuckState::Gutter;
                p.halt();
            }
            self.selected = None;
            self.gutter.scatter(&mut self.rng, &geom);
        } else {
            for p in &mut self.gutter.pucks {
                if matches!(p.state, PuckState::Gutter | PuckState::Ready) {
                    p.state = PuckState::Gutter;
                    p.halt();
                }
            }
            // Scatter only the holding-area pucks, leaving live ones alone
            let mut idle = Gutter::new();
            let mut live = Vec::new();
            for p in self.gutter.pucks.drain(..) {
                if p.state == PuckState::Gutter {
                    idle.restore_puck(p);
                } else {
                    live.push(p);
                }
            }
            idle.scatter(&mut self.rng, &geom);
            self.gutter.pucks = idle.pucks;
            self.gutter.pucks.extend(live);
        }
    }

    /// Hover feedback: highlight the puck under the pointer if the current
    /// player could pick it up. Cleared every tick.
    pub fn hover(&mut self, pos: Vec2) {
        if self.phase != GamePhase::Aiming || self.selected.is_some() {
            return;
        }
        for p in &mut self.gutter.pucks {
            let pickable = p.state.selectable()
                && (self.game_over || p.owner == self.current_turn)
                && p.pos.distance(pos) < p.radius;
            p.highlighted = pickable;
        }
    }

    /// Puck list in the order it should be drawn (derived, never reorders
    /// the simulation collection)
    pub fn pucks_render_order(&self) -> impl Iterator<Item = &Puck> {
        self.gutter
            .render_order()
            .into_iter()
            .map(|i| &self.gutter.pucks[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_game() -> GameState {
        GameState::new(Settings::default(), 11)
    }

    fn staged_puck_of(state: &GameState, player: Player) -> u32 {
        state
            .gutter
            .pucks
            .iter()
            .find(|p| p.owner == player && p.state.selectable())
            .map(|p| p.id)
            .unwrap()
    }

    #[test]
    fn test_new_game_deals_four_pucks_each() {
        let state = new_game();
        let p1 = state.gutter.pucks.iter().filter(|p| p.owner == Player::P1).count();
        let p2 = state.gutter.pucks.iter().filter(|p| p.owner == Player::P2).count();
        assert_eq!((p1, p2), (4, 4));
        assert_eq!(state.throws_left, [4, 4]);
        assert_eq!(state.phase, GamePhase::Aiming);
        assert!(state.gutter.pucks.iter().all(|p| p.state == PuckState::Gutter));
    }

    #[test]
    fn test_select_rejects_opponent_puck() {
        let mut state = new_game();
        let theirs = staged_puck_of(&state, state.current_turn.other());
        assert!(!state.select_puck(theirs));

        let mine = staged_puck_of(&state, state.current_turn);
        assert!(state.select_puck(mine));
        assert_eq!(state.selected, Some(mine));
    }

    #[test]
    fn test_select_any_puck_in_free_play() {
        let mut state = new_game();
        state.game_over = true;
        let theirs = staged_puck_of(&state, state.current_turn.other());
        assert!(state.select_puck(theirs));
    }

    #[test]
    fn test_counted_throw_consumes_a_throw_and_starts_moving() {
        let mut state = new_game();
        let turn = state.current_turn;
        let id = staged_puck_of(&state, turn);
        state.select_puck(id);
        state.drag_selected(Vec2::new(10.0, 10.0));
        state.release_selected(Vec2::new(8.0, 0.0));

        assert_eq!(state.throws_remaining(turn), 3);
        assert_eq!(state.phase, GamePhase::Moving);
        let idx = state.gutter.puck_index(id).unwrap();
        assert_eq!(state.gutter.pucks[idx].state, PuckState::Thrown);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_release_past_throw_line_cancels() {
        let mut state = new_game();
        let id = staged_puck_of(&state, state.current_turn);
        state.select_puck(id);
        let idx = state.gutter.puck_index(id).unwrap();
        // Park it past the throw line without the constraint pass
        state.gutter.pucks[idx].set_pos(Vec2::new(60.0, 10.0));
        state.release_selected(Vec2::new(8.0, 0.0));

        assert_eq!(state.throws_remaining(state.current_turn), 4);
        assert_eq!(state.gutter.pucks[idx].state, PuckState::Ready);
        assert_eq!(state.phase, GamePhase::Aiming);
    }

    #[test]
    fn test_weak_release_cancels_to_gutter() {
        let mut state = new_game();
        let id = staged_puck_of(&state, state.current_turn);
        state.select_puck(id);
        state.release_selected(Vec2::new(0.1, 0.0));
        let idx = state.gutter.puck_index(id).unwrap();
        assert_eq!(state.gutter.pucks[idx].state, PuckState::Gutter);
    }

    #[test]
    fn test_throw_speed_clamped_to_max_power() {
        let mut state = new_game();
        let id = staged_puck_of(&state, state.current_turn);
        state.throw_puck(id, Vec2::new(100.0, 0.0), true);
        let idx = state.gutter.puck_index(id).unwrap();
        assert!((state.gutter.pucks[idx].speed() - MAX_POWER).abs() < 1e-4);
    }

    #[test]
    fn test_select_with_no_throws_left_is_noop() {
        let mut state = new_game();
        let turn = state.current_turn;
        state.throws_left[turn.idx()] = 0;
        let id = staged_puck_of(&state, turn);
        assert!(!state.select_puck(id));
    }

    #[test]
    fn test_resize_resets_round_with_new_geometry() {
        let mut state = new_game();
        state.scoreboard.scores = [5, 3];
        state.resize_table(14);
        assert_eq!(state.geometry().length_ft, 14);
        assert_eq!(state.scoreboard.scores, [0, 0]);
        assert_eq!(state.throws_left, [4, 4]);
    }

    #[test]
    fn test_color_change_keeps_round_running() {
        let mut state = new_game();
        state.scoreboard.round_points = [2, 0];
        let mut settings = state.settings.clone();
        settings.p2_color = PuckColor::Purple;
        state.apply_settings(settings);
        assert_eq!(state.scoreboard.round_points, [2, 0]);
        assert!(state
            .gutter
            .pucks
            .iter()
            .filter(|p| p.owner == Player::P2)
            .all(|p| p.color == PuckColor::Purple));
    }

    #[test]
    fn test_reset_idle_pucks_keeps_live_pucks() {
        let mut state = new_game();
        let id = staged_puck_of(&state, state.current_turn);
        state.throw_puck(id, Vec2::new(8.0, 0.0), true);
        let idx = state.gutter.puck_index(id).unwrap();
        let live_pos = state.gutter.pucks[idx].pos;

        state.reset_idle_pucks();
        let idx = state.gutter.puck_index(id).unwrap();
        assert_eq!(state.gutter.pucks[idx].pos, live_pos);
        assert_eq!(state.gutter.pucks[idx].state, PuckState::Thrown);
        assert_eq!(state.gutter.pucks.len(), 8);
    }
}
