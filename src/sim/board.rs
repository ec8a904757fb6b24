//! Gutter spatial manager
//!
//! Owns the puck collection and enforces zone constraints: holding-area
//! placement (random scatter and nearest-free-slot return), the drag-time
//! constraint pass, and derived render layering. Simulation iteration order
//! is the stable puck vector; z-order is recomputed per frame and never
//! perturbs it.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::TableGeometry;
use super::physics;
use super::puck::{Player, Puck, PuckColor, PuckState};
use crate::consts::*;

/// Rejection-sampling attempts before falling back to a stacked layout
const SCATTER_ATTEMPTS: u32 = 200;
/// Ring expansions before nearest-slot search gives up
const NEAREST_ATTEMPTS: u32 = 100;
/// Ring radius step for nearest-slot search (inches)
const RING_STEP: f32 = 0.5;
/// Drag constraint relaxation iterations per update
const CONSTRAINT_ITERATIONS: u32 = 3;

/// The puck collection and holding-area logic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gutter {
    pub pucks: Vec<Puck>,
    /// Post-game-over mode: relaxed ownership and confinement rules
    pub free_play: bool,
    next_id: u32,
}

impl Gutter {
    pub fn new() -> Self {
        Self {
            pucks: Vec::new(),
            free_play: false,
            next_id: 1,
        }
    }

    pub fn clear(&mut self) {
        self.pucks.clear();
    }

    /// Create a puck in the holding area, returning its id
    pub fn spawn_puck(&mut self, owner: Player, diameter: f32, color: PuckColor) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.pucks.push(Puck::new(id, owner, diameter, color));
        id
    }

    /// Restore a puck from a snapshot, keeping ids unique
    pub fn restore_puck(&mut self, puck: Puck) {
        self.next_id = self.next_id.max(puck.id + 1);
        self.pucks.push(puck);
    }

    pub fn puck_index(&self, id: u32) -> Option<usize> {
        self.pucks.iter().position(|p| p.id == id)
    }

    /// Random scatter with rejection sampling for round setup.
    ///
    /// Each puck samples positions in the shooter-side strip until it keeps
    /// minimum separation from the pucks placed before it; a deterministic
    /// stacked column guarantees placement always terminates.
    pub fn scatter(&mut self, rng: &mut Pcg32, geom: &TableGeometry) {
        let strip = geom.scatter_rect();
        let mut placed: Vec<(Vec2, f32)> = Vec::new();

        for (fallback_slot, puck) in self.pucks.iter_mut().enumerate() {
            let r = puck.radius;
            let min_x = strip.min.x + r;
            let max_x = strip.max.x - r - 0.5;
            let min_y = strip.min.y + r;
            let max_y = strip.max.y - r;

            let mut pos = None;
            for _ in 0..SCATTER_ATTEMPTS {
                let candidate = Vec2::new(
                    rng.random_range(min_x..max_x),
                    rng.random_range(min_y..max_y),
                );
                let clear = placed
                    .iter()
                    .all(|(other, or)| candidate.distance(*other) >= r + or + 0.25);
                if clear {
                    pos = Some(candidate);
                    break;
                }
            }

            let pos = pos.unwrap_or_else(|| {
                // Stacked column near the strip's inner edge
                let step = r * 2.0 + 0.5;
                let rows = ((max_y - min_y) / step).max(1.0) as usize;
                let slot = fallback_slot % rows.max(1);
                Vec2::new(min_x + r, min_y + slot as f32 * step)
            });

            puck.set_pos(pos);
            puck.halt();
            placed.push((pos, r));
        }
    }

    /// Return a puck to the holding area near its last off-board position.
    ///
    /// Searches outward in concentric rings for the first spot that is inside
    /// the frame, off the play band, and clear of other holding-area pucks,
    /// so the puck visually settles near where it was.
    pub fn place_puck_nearest(&mut self, idx: usize, geom: &TableGeometry) {
        let target = self.pucks[idx].pos;
        let r = self.pucks[idx].radius;
        let outer = geom.outer_rect();

        let others: Vec<Vec2> = self
            .pucks
            .iter()
            .enumerate()
            .filter(|(i, p)| *i != idx && p.state == PuckState::Gutter)
            .map(|(_, p)| p.pos)
            .collect();

        let mut found = target;
        let mut search_radius = 0.0f32;
        'search: for _ in 0..NEAREST_ATTEMPTS {
            let candidates: Vec<Vec2> = if search_radius == 0.0 {
                vec![target]
            } else {
                let circumference = std::f32::consts::TAU * search_radius;
                let steps = ((circumference / RING_STEP) as usize).max(8);
                (0..steps)
                    .map(|i| {
                        let a = i as f32 / steps as f32 * std::f32::consts::TAU;
                        target + Vec2::new(a.cos(), a.sin()) * search_radius
                    })
                    .collect()
            };

            for c in candidates {
                if c.x < outer.min.x + r || c.x > outer.max.x - r {
                    continue;
                }
                if c.y < outer.min.y + r || c.y > outer.max.y - r {
                    continue;
                }
                // The play band: anything at table height right of the near end
                let on_surface =
                    c.x + r > 0.0 && c.y + r > 0.0 && c.y - r < TABLE_WIDTH_IN;
                if on_surface {
                    continue;
                }
                let overlapping = others
                    .iter()
                    .any(|o| c.distance(*o) < r * 2.0 + 0.1);
                if !overlapping {
                    found = c;
                    break 'search;
                }
            }
            search_radius += RING_STEP;
        }

        let puck = &mut self.pucks[idx];
        puck.set_pos(found);
        puck.halt();
    }

    /// Constraint pass while a puck is being dragged.
    ///
    /// Holding-area pucks collide with the held puck dynamically (kick rule)
    /// and with each other statically; the held puck also shoves settling
    /// board pucks, while settled ones are solid obstacles outside free play.
    /// Finally every hand puck is clamped to the frame and confined away from
    /// the zone its state forbids.
    pub fn update_constraints(&mut self, geom: &TableGeometry) {
        let hand: Vec<usize> = self
            .pucks
            .iter()
            .enumerate()
            .filter(|(_, p)| matches!(p.state, PuckState::Gutter | PuckState::Selected))
            .map(|(i, _)| i)
            .collect();
        let active: Vec<usize> = self
            .pucks
            .iter()
            .enumerate()
            .filter(|(_, p)| p.state.on_table())
            .map(|(i, _)| i)
            .collect();

        for _ in 0..CONSTRAINT_ITERATIONS {
            for a in 0..hand.len() {
                for b in (a + 1)..hand.len() {
                    let (p1, p2) = pair_mut(&mut self.pucks, hand[a], hand[b]);
                    if p1.state == PuckState::Selected || p2.state == PuckState::Selected {
                        physics::collide_pair(p1, p2);
                    } else {
                        physics::resolve_static_overlap(p1, p2);
                    }
                }
            }
        }

        for &h in &hand {
            for &a in &active {
                let (hand_p, active_p) = pair_mut(&mut self.pucks, h, a);
                if active_p.state == PuckState::OnBoard {
                    // Settled pucks are immovable obstacles unless free play
                    // lets the held puck plow through them
                    if self.free_play && hand_p.state == PuckState::Selected {
                        physics::collide_pair(hand_p, active_p);
                    }
                } else if hand_p.state == PuckState::Selected {
                    physics::collide_pair(hand_p, active_p);
                } else {
                    physics::resolve_static_push(active_p, hand_p);
                }
            }
        }

        let outer = geom.outer_rect();
        let play = geom.play_rect();
        let past_throw = geom.beyond_throw_line_rect();
        for &h in &hand {
            let puck = &mut self.pucks[h];
            puck.pos = puck.pos.clamp(outer.min + Vec2::splat(puck.radius), outer.max - Vec2::splat(puck.radius));

            if self.free_play && puck.state == PuckState::Selected {
                continue;
            }
            if puck.state == PuckState::Gutter {
                physics::resolve_rect_obstacle(puck, &play);
            } else {
                physics::resolve_rect_obstacle(puck, &past_throw);
            }
        }
    }

    /// Presentation z-order: holding-area pucks below, active pucks above,
    /// settled board pucks on top. Stable within each layer.
    pub fn render_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.pucks.len()).collect();
        order.sort_by_key(|&i| match self.pucks[i].state {
            PuckState::Gutter => 0u8,
            PuckState::Selected | PuckState::Ready | PuckState::Thrown => 1,
            PuckState::OnBoard => 2,
        });
        order
    }
}

impl Default for Gutter {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable references to two distinct pucks by index
fn pair_mut(pucks: &mut [Puck], i: usize, j: usize) -> (&mut Puck, &mut Puck) {
    debug_assert!(i != j);
    if i < j {
        let (a, b) = pucks.split_at_mut(j);
        (&mut a[i], &mut b[0])
    } else {
        let (a, b) = pucks.split_at_mut(i);
        (&mut b[0], &mut a[j])
    }
}
