//! Motion integration
//!
//! One Euler step per frame, no substepping. Velocities are in canvas units
//! per frame; only the blue fuse and visual timers use wall-clock
//! milliseconds.

use glam::Vec2;

use super::state::{Ball, Bounds, GameState, Player};
use crate::config::{GameConfig, ParticleConfig, PlayerConfig};

/// What happened to a ball during its motion step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallMotion {
    /// Still in play (possibly after bouncing)
    InPlay,
    /// Drifted past the offscreen margin and must be released
    Culled,
}

/// Move the player, bleed off speed and keep the whole circle on the canvas
pub fn advance_player(player: &mut Player, bounds: Bounds, config: &PlayerConfig) {
    player.pos += player.vel;
    player.vel *= config.friction;

    let r = player.radius;
    if player.pos.x < r {
        player.pos.x = r;
        player.vel.x = 0.0;
    } else if player.pos.x > bounds.width - r {
        player.pos.x = bounds.width - r;
        player.vel.x = 0.0;
    }

    if player.pos.y < r {
        player.pos.y = r;
        player.vel.y = 0.0;
    } else if player.pos.y > bounds.height - r {
        player.pos.y = bounds.height - r;
        player.vel.y = 0.0;
    }
}

/// Pointer pulls the player toward itself while a drag is active
pub fn apply_drag(player: &mut Player, target: Vec2, config: &PlayerConfig) {
    if player.dragging {
        player.vel += (target - player.pos) * config.drag_accel;
    }
}

/// Advance a ball one frame.
///
/// The far-offscreen cull is checked right after the move and wins over any
/// bounce, so a ball well past the margin is never reflected back in.
/// Bounces are pure reflections clamped to the edge.
pub fn advance_ball(ball: &mut Ball, bounds: Bounds, margin: f32) -> BallMotion {
    ball.pos += ball.vel;

    if bounds.is_far_outside(ball.pos, margin) {
        return BallMotion::Culled;
    }

    let r = ball.radius;
    if ball.pos.x - r < 0.0 || ball.pos.x + r > bounds.width {
        ball.vel.x = -ball.vel.x;
        ball.pos.x = if ball.pos.x - r < 0.0 { r } else { bounds.width - r };
    }
    if ball.pos.y - r < 0.0 || ball.pos.y + r > bounds.height {
        ball.vel.y = -ball.vel.y;
        ball.pos.y = if ball.pos.y - r < 0.0 { r } else { bounds.height - r };
    }

    BallMotion::InPlay
}

/// Spin vegetables (render-only)
pub fn spin_vegetables(state: &mut GameState, config: &GameConfig) {
    for veg in &mut state.vegetables {
        veg.rotation += config.vegetable.spin;
    }
}

/// Grow and fade shock rings, dropping finished ones
pub fn update_explosions(state: &mut GameState, config: &GameConfig, dt_ms: f32) {
    let duration = config.explosion.duration_ms;
    state.explosions.retain_mut(|e| {
        e.age_ms += dt_ms;
        if e.age_ms >= duration {
            return false;
        }
        let progress = e.age_ms / duration;
        e.radius = progress * e.max_radius;
        e.alpha = 1.0 - progress;
        true
    });
}

/// Move debris particles and release expired ones back to their pool
pub fn update_particles(state: &mut GameState, config: &ParticleConfig, dt_ms: f32) {
    let pool = &mut state.particle_pool;
    state.particles.retain(|&id| {
        let Some(p) = pool.get_mut(id) else {
            return false;
        };
        p.age_ms += dt_ms;
        if p.age_ms >= p.lifetime_ms {
            pool.release(id);
            return false;
        }
        p.pos += p.vel;
        p.vel.y += config.gravity;
        p.vel *= config.drag;
        p.alpha = 1.0 - p.age_ms / p.lifetime_ms;
        true
    });
}
