//! Collision detection and the interactions it triggers
//!
//! Circles collide when their centres are strictly closer than the sum of
//! their radii. On top of the raw test live the four interactions: the
//! player eating a ball or vegetable, a blue ball eating another ball, and
//! the bouncy ball-ball response.

use glam::Vec2;

use super::events::GameEvent;
use super::outcome::change_size;
use super::state::{Ball, BallId, BallKind, EndReason, Fuse, GameState};
use crate::circles_overlap;
use crate::config::GameConfig;

/// Result of a circle contact query
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the circles overlap
    pub hit: bool,
    /// Unit vector from the first centre toward the second
    pub normal: Vec2,
    /// Centre distance
    pub distance: f32,
    /// Overlap depth (sum of radii minus distance)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            distance: 0.0,
            penetration: 0.0,
        }
    }
}

/// Contact between two circles
///
/// Coincident centres fall back to +X so the response stays finite.
pub fn circle_contact(a: Vec2, ra: f32, b: Vec2, rb: f32) -> CollisionResult {
    if !circles_overlap(a, ra, b, rb) {
        return CollisionResult::miss();
    }
    let delta = b - a;
    let distance = delta.length();
    CollisionResult {
        hit: true,
        normal: delta.normalize_or(Vec2::X),
        distance,
        penetration: ra + rb - distance,
    }
}

/// Symmetric ball-ball overlap test
#[inline]
pub fn balls_collide(a: &Ball, b: &Ball) -> bool {
    circles_overlap(a.pos, a.radius, b.pos, b.radius)
}

/// Bounce two overlapping balls apart.
///
/// The relative velocity along the contact normal is scaled by
/// `elasticity` and applied as equal and opposite impulses, then each ball
/// is pushed back by half the overlap so they end exactly touching.
pub fn resolve_elastic(a: &mut Ball, b: &mut Ball, elasticity: f32) {
    let contact = circle_contact(a.pos, a.radius, b.pos, b.radius);
    if !contact.hit {
        return;
    }
    let n = contact.normal;

    let impulse = (b.vel - a.vel).dot(n) * elasticity;
    a.vel += n * impulse;
    b.vel -= n * impulse;

    let correction = contact.penetration / 2.0;
    a.pos -= n * correction;
    b.pos += n * correction;
}

/// Player swallows a ball. Returns the end reason if this ended the run.
pub fn player_eats_ball(
    state: &mut GameState,
    config: &GameConfig,
    id: BallId,
) -> Option<EndReason> {
    let ball = state.remove_ball(id)?;
    state.emit(GameEvent::BallEaten {
        pos: ball.pos,
        color: ball.color,
    });

    let delta = match ball.kind {
        BallKind::Orange => config.balls.orange.score_impact,
        BallKind::Green => config.balls.green.score_impact,
        BallKind::Blue { .. } => 0,
    };
    change_size(state, &config.player, delta)
}

/// Blue ball swallows `target`, grows, and lights its fuse on reaching the
/// eat threshold. Every further eat restarts the countdown.
pub fn blue_eats_ball(state: &mut GameState, config: &GameConfig, blue: BallId, target: BallId) {
    if !state.ball_pool.is_live(blue) || state.remove_ball(target).is_none() {
        return;
    }
    let blue_config = &config.balls.blue;
    let Some(ball) = state.ball_mut(blue) else {
        return;
    };
    let BallKind::Blue { eaten_count, fuse } = &mut ball.kind else {
        return;
    };

    *eaten_count += 1;
    ball.radius = (ball.radius + blue_config.growth_per_eat).min(blue_config.max_radius);

    let count = *eaten_count;
    let mut armed = false;
    if count >= blue_config.eat_threshold {
        armed = *fuse == Fuse::Idle;
        *fuse = Fuse::Armed {
            remaining_ms: blue_config.detonation_delay_ms,
            pulse_phase: 0.0,
        };
    }

    let pos = ball.pos;
    state.emit(GameEvent::BlueAte {
        pos,
        eaten_count: count,
    });
    if armed {
        log::debug!("Blue ball armed at ({:.0}, {:.0})", pos.x, pos.y);
        state.emit(GameEvent::BlueArmed { pos });
    }
}

/// First non-blue ball overlapping `blue`, scanning the active list from the back
pub fn find_blue_prey(state: &GameState, blue: BallId) -> Option<BallId> {
    let hunter = state.ball(blue)?;
    state.balls.iter().rev().copied().find(|&other| {
        other != blue
            && state
                .ball(other)
                .is_some_and(|b| !b.kind.is_blue() && balls_collide(hunter, b))
    })
}

/// Player swallows the vegetable at `index`. Returns the end reason if this
/// ended the run.
pub fn player_eats_vegetable(
    state: &mut GameState,
    config: &GameConfig,
    index: usize,
) -> Option<EndReason> {
    if index >= state.vegetables.len() {
        return None;
    }
    let veg = state.vegetables.remove(index);
    state.emit(GameEvent::VegetableEaten { pos: veg.pos });
    change_size(state, &config.player, config.vegetable.score_impact)
}
