//! Pure physics operations on one or two pucks
//!
//! Simplified impulse model tuned for game feel: equal-mass elastic
//! collisions, reflective wall bounces, rectangular obstacle confinement,
//! and the asymmetric "kick" applied by a held puck. Nothing here touches
//! game state beyond the pucks passed in.

use glam::Vec2;

use super::geometry::Rect;
use super::puck::{Puck, PuckState};
use crate::consts::*;

/// Advance one tick of motion and apply friction once.
///
/// Position advances in [`MOVE_SUBSTEPS`] increments, invoking `constrain`
/// between increments so a fast puck cannot tunnel through a thin obstacle.
/// Returns whether the puck is still moving afterward.
pub fn integrate_with<F>(puck: &mut Puck, friction: f32, mut constrain: F) -> bool
where
    F: FnMut(&mut Puck),
{
    if !puck.is_moving {
        return false;
    }

    let step = puck.vel / MOVE_SUBSTEPS as f32;
    for _ in 0..MOVE_SUBSTEPS {
        puck.pos += step;
        constrain(puck);
    }

    puck.vel *= friction;
    if puck.speed() < MIN_SPEED {
        puck.halt();
        return false;
    }
    true
}

/// [`integrate_with`] without a confinement pass
pub fn integrate(puck: &mut Puck, friction: f32) -> bool {
    integrate_with(puck, friction, |_| {})
}

/// Reflect off the outer frame walls, clamping position to the bound
pub fn bounce_bounds(puck: &mut Puck, bounds: &Rect) {
    let r = puck.radius;
    if puck.pos.x < bounds.min.x + r {
        puck.pos.x = bounds.min.x + r;
        puck.vel.x *= WALL_BOUNCE;
    } else if puck.pos.x > bounds.max.x - r {
        puck.pos.x = bounds.max.x - r;
        puck.vel.x *= WALL_BOUNCE;
    }

    if puck.pos.y < bounds.min.y + r {
        puck.pos.y = bounds.min.y + r;
        puck.vel.y *= WALL_BOUNCE;
    } else if puck.pos.y > bounds.max.y - r {
        puck.pos.y = bounds.max.y - r;
        puck.vel.y *= WALL_BOUNCE;
    }
}

/// Hard clamp to the frame, zeroing the crossed velocity component
pub fn clamp_bounds(puck: &mut Puck, bounds: &Rect) {
    let r = puck.radius;
    if puck.pos.x < bounds.min.x + r {
        puck.pos.x = bounds.min.x + r;
        puck.vel.x = 0.0;
    } else if puck.pos.x > bounds.max.x - r {
        puck.pos.x = bounds.max.x - r;
        puck.vel.x = 0.0;
    }

    if puck.pos.y < bounds.min.y + r {
        puck.pos.y = bounds.min.y + r;
        puck.vel.y = 0.0;
    } else if puck.pos.y > bounds.max.y - r {
        puck.pos.y = bounds.max.y - r;
        puck.vel.y = 0.0;
    }
}

/// Keep a puck out of an axis-aligned obstacle rectangle.
///
/// Pushes the puck out along the separation normal and applies a reflective
/// impulse if it was moving into the obstacle. A puck whose center sits
/// exactly on/inside the rectangle is ejected through the nearest edge
/// (Manhattan distance tie-break), never left stuck.
pub fn resolve_rect_obstacle(puck: &mut Puck, rect: &Rect) {
    let closest = rect.closest_point(puck.pos);
    let delta = puck.pos - closest;
    let dist_sq = delta.length_squared();

    if dist_sq >= puck.radius * puck.radius {
        return;
    }

    let normal;
    if dist_sq == 0.0 {
        // Degenerate: center inside the rectangle
        let d_left = (puck.pos.x - rect.min.x).abs();
        let d_right = (puck.pos.x - rect.max.x).abs();
        let d_top = (puck.pos.y - rect.min.y).abs();
        let d_bottom = (puck.pos.y - rect.max.y).abs();
        let m = d_left.min(d_right).min(d_top).min(d_bottom);

        if m == d_left {
            puck.pos.x = rect.min.x - puck.radius;
            normal = Vec2::new(-1.0, 0.0);
        } else if m == d_right {
            puck.pos.x = rect.max.x + puck.radius;
            normal = Vec2::new(1.0, 0.0);
        } else if m == d_top {
            puck.pos.y = rect.min.y - puck.radius;
            normal = Vec2::new(0.0, -1.0);
        } else {
            puck.pos.y = rect.max.y + puck.radius;
            normal = Vec2::new(0.0, 1.0);
        }
    } else {
        let dist = dist_sq.sqrt();
        normal = delta / dist;
        puck.pos += normal * (puck.radius - dist);
    }

    let vn = puck.vel.dot(normal);
    if vn < 0.0 {
        puck.vel += normal * (-(1.0 + OBSTACLE_RESTITUTION) * vn);
    }
}

/// Detect and resolve a collision between two pucks.
///
/// A held (`Selected`) puck is treated as immovable: the other puck gets a
/// full positional push-out plus a velocity kick proportional to the overlap.
/// Otherwise an equal-mass elastic impulse with positional correction is
/// split between both pucks; separating pairs are left alone to avoid jitter.
pub fn collide_pair(p1: &mut Puck, p2: &mut Puck) {
    let delta = p1.pos - p2.pos;
    let dist = delta.length();
    let min_dist = p1.radius + p2.radius;
    if dist >= min_dist {
        return;
    }

    // Coincident centers: defined fallback normal instead of dividing by zero
    let (normal, dist) = if dist == 0.0 {
        (Vec2::new(1.0, 0.0), 0.001)
    } else {
        (delta / dist, dist)
    };
    let overlap = min_dist - dist;

    if p1.state == PuckState::Selected {
        apply_kick(p2, -normal, overlap);
        return;
    }
    if p2.state == PuckState::Selected {
        apply_kick(p1, normal, overlap);
        return;
    }

    // Positional correction: split the overlap evenly
    let correction = normal * (overlap / 2.0);
    p1.pos += correction;
    p2.pos -= correction;

    let rel_vel = p1.vel - p2.vel;
    let vel_along_normal = rel_vel.dot(normal);
    if vel_along_normal > 0.0 {
        return;
    }

    // Equal-mass elastic impulse, split between both pucks
    let j = -(1.0 + PUCK_RESTITUTION) * vel_along_normal / 2.0;
    let impulse = normal * j;
    p1.vel += impulse;
    p2.vel -= impulse;

    p1.is_moving = true;
    p2.is_moving = true;

    // A settled puck that gets hit is back in motion
    if p1.state == PuckState::OnBoard {
        p1.state = PuckState::Thrown;
    }
    if p2.state == PuckState::OnBoard {
        p2.state = PuckState::Thrown;
    }
}

/// Shove a free puck away from a held one
fn apply_kick(puck: &mut Puck, normal: Vec2, overlap: f32) {
    puck.pos += normal * overlap;
    puck.vel += normal * (overlap * KICK_POWER);
    puck.is_moving = true;
    if puck.state == PuckState::OnBoard {
        puck.state = PuckState::Thrown;
    }
}

/// Split overlap evenly with no impulse (holding-area pucks at rest)
pub fn resolve_static_overlap(p1: &mut Puck, p2: &mut Puck) {
    let delta = p1.pos - p2.pos;
    let dist = delta.length();
    let min_dist = p1.radius + p2.radius + STATIC_MARGIN;
    if dist >= min_dist {
        return;
    }

    let normal = if dist == 0.0 {
        Vec2::new(1.0, 0.0)
    } else {
        delta / dist
    };
    let correction = normal * ((min_dist - dist) / 2.0);
    p1.pos += correction;
    p2.pos -= correction;
}

/// Move `pushed` completely clear of `pusher` (used while dragging)
pub fn resolve_static_push(pusher: &Puck, pushed: &mut Puck) {
    let delta = pushed.pos - pusher.pos;
    let dist = delta.length();
    let min_dist = pusher.radius + pushed.radius + STATIC_MARGIN;
    if dist >= min_dist {
        return;
    }

    let normal = if dist == 0.0 {
        Vec2::new(1.0, 0.0)
    } else {
        delta / dist
    };
    pushed.pos += normal * (min_dist - dist);
}
