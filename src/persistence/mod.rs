//! Save/load of the full game snapshot
//!
//! A snapshot is a versioned JSON document with sectioned payload: settings,
//! scores, gameplay flags, and the full puck list. Restoring a snapshot that
//! was taken mid-pause restarts the pause from the top rather than resuming
//! a partial countdown.

use std::fs;
use std::io;
use std::path::PathBuf;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::puck::{Player, Puck};
use crate::sim::score::Scoreboard;
use crate::sim::state::{GamePhase, GameState};
use crate::sim::Gutter;

/// Bumped whenever the snapshot layout changes incompatibly
pub const SNAPSHOT_VERSION: u32 = 1;

const SAVE_DIR: &str = "shufflepuck";
const SAVE_FILE: &str = "save.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSection {
    pub p1_score: u32,
    pub p2_score: u32,
    pub round_p1: u32,
    pub round_p2: u32,
    pub game_winner: Option<Player>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameplaySection {
    pub current_turn: Player,
    pub round_starter: Player,
    pub throws_left: [u8; 2],
    pub game_over: bool,
    pub phase: GamePhase,
    /// True when the snapshot was taken during the post-round pause
    pub delay_active: bool,
}

/// Complete persisted game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub settings: Settings,
    pub scores: ScoreSection,
    pub gameplay: GameplaySection,
    pub pucks: Vec<Puck>,
    pub seed: u64,
}

impl Snapshot {
    /// Capture the current session. A held puck is recorded as-is; its
    /// `Selected` state survives the round trip.
    pub fn capture(state: &GameState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            settings: state.settings.clone(),
            scores: ScoreSection {
                p1_score: state.scoreboard.scores[0],
                p2_score: state.scoreboard.scores[1],
                round_p1: state.scoreboard.round_points[0],
                round_p2: state.scoreboard.round_points[1],
                game_winner: state.scoreboard.game_winner,
            },
            gameplay: GameplaySection {
                current_turn: state.current_turn,
                round_starter: state.round_starter,
                throws_left: state.throws_left,
                game_over: state.game_over,
                phase: state.phase,
                delay_active: state.phase == GamePhase::RoundOverDelay,
            },
            pucks: state.gutter.pucks.clone(),
            seed: state.seed,
        }
    }

    /// Rebuild a playable session from the snapshot
    pub fn restore(self) -> GameState {
        let settings = self.settings.sanitized();

        let mut gutter = Gutter::new();
        gutter.free_play = self.gameplay.game_over;
        for puck in self.pucks {
            gutter.restore_puck(puck);
        }

        let selected = gutter
            .pucks
            .iter()
            .find(|p| p.state == crate::sim::PuckState::Selected)
            .map(|p| p.id);

        // The pause restarts from the top; a partial countdown is not saved
        let delay_ticks = if self.gameplay.delay_active {
            crate::consts::ROUND_OVER_DELAY_TICKS
        } else {
            0
        };

        GameState {
            settings,
            gutter,
            scoreboard: Scoreboard {
                scores: [self.scores.p1_score, self.scores.p2_score],
                round_points: [self.scores.round_p1, self.scores.round_p2],
                game_winner: self.scores.game_winner,
            },
            current_turn: self.gameplay.current_turn,
            round_starter: self.gameplay.round_starter,
            throws_left: self.gameplay.throws_left,
            game_over: self.gameplay.game_over,
            phase: self.gameplay.phase,
            delay_ticks,
            time_ticks: 0,
            selected,
            seed: self.seed,
            rng: Pcg32::seed_from_u64(self.seed),
        }
    }
}

/// Platform save path, e.g. `~/.local/share/shufflepuck/save.json`
pub fn save_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(SAVE_DIR).join(SAVE_FILE))
}

/// Write the snapshot to disk, creating the save directory if needed
pub fn save(snapshot: &Snapshot) -> io::Result<()> {
    let Some(path) = save_path() else {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "no platform data directory",
        ));
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(&path, json)?;
    log::info!("saved game to {}", path.display());
    Ok(())
}

/// Load the snapshot from disk. Missing, unreadable, malformed, or
/// wrong-version saves all come back as `None`; the caller starts fresh.
pub fn load() -> Option<Snapshot> {
    let path = save_path()?;
    let json = fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<Snapshot>(&json) {
        Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION => {
            log::info!("loaded save from {}", path.display());
            Some(snapshot)
        }
        Ok(snapshot) => {
            log::warn!(
                "ignoring save with unsupported version {}",
                snapshot.version
            );
            None
        }
        Err(e) => {
            log::warn!("corrupt save file, starting fresh: {e}");
            None
        }
    }
}

/// Delete the save file if present
pub fn clear() -> io::Result<()> {
    if let Some(path) = save_path() {
        if path.exists() {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}
