//! Shufflepuck entry point
//!
//! Headless driver: restores the saved session (or deals a fresh game),
//! plays a scripted exhibition until someone reaches the target score, and
//! saves the final session on the way out.

use glam::Vec2;

use shufflepuck::consts::*;
use shufflepuck::persistence::{self, Snapshot};
use shufflepuck::settings::Settings;
use shufflepuck::sim::{run_until_settled, GamePhase, GameState};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0xC0FFEE);

    let mut state = match persistence::load() {
        Some(snapshot) => snapshot.restore(),
        None => GameState::new(Settings::default(), seed),
    };

    log::info!(
        "table: {} ft, target: {} points, seed: {}",
        state.settings.length_ft,
        state.settings.target_score,
        state.seed
    );

    let mut throw_no = 0u32;
    while !state.game_over {
        if state.phase != GamePhase::Aiming {
            run_until_settled(&mut state, 10_000);
            continue;
        }

        let shooter = state.current_turn;
        let Some(idx) = state
            .gutter
            .pucks
            .iter()
            .position(|p| p.owner == shooter && p.state.selectable())
        else {
            break;
        };
        let id = state.gutter.pucks[idx].id;

        // Scripted aim: alternate lanes, vary power enough to spread pucks
        // across the scoring bands
        throw_no += 1;
        let lane = 4.0 + 3.0 * (throw_no % 5) as f32;
        let power = 0.8 + 0.1 * (throw_no % 4) as f32;
        state.gutter.pucks[idx].set_pos(Vec2::new(10.0, lane));
        state.throw_puck(id, Vec2::new(power, 0.02 * (throw_no % 3) as f32), true);
        run_until_settled(&mut state, 10_000);

        log::info!(
            "throw {}: {:?} | P1 {} - P2 {} (round {} - {})",
            throw_no,
            shooter,
            state.scoreboard.scores[0],
            state.scoreboard.scores[1],
            state.scoreboard.round_points[0],
            state.scoreboard.round_points[1],
        );

        if throw_no > 40 * PUCKS_PER_PLAYER as u32 * 2 {
            log::warn!("exhibition cap reached, stopping");
            break;
        }
    }

    if let Some(winner) = state.scoreboard.game_winner {
        log::info!(
            "{:?} wins {} - {} after {} throws",
            winner,
            state.scoreboard.score(winner),
            state.scoreboard.score(winner.other()),
            throw_no
        );
    }

    if let Err(e) = persistence::save(&Snapshot::capture(&state)) {
        log::warn!("could not save game: {e}");
    }
}
