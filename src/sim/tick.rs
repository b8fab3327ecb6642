//! Per-frame simulation step
//!
//! Order within a frame: spawn, player motion, the ball pass (motion, cull,
//! fuse, eating, bounces), vegetables, visual records, clock. A frame either
//! runs to completion or, once the run has ended, not at all.

use super::collision::{
    balls_collide, blue_eats_ball, find_blue_prey, player_eats_ball, player_eats_vegetable,
    resolve_elastic,
};
use super::explosion::{detonate, tick_fuse};
use super::outcome::bound_violation;
use super::physics::{
    BallMotion, advance_ball, advance_player, spin_vegetables, update_explosions, update_particles,
};
use super::spawn::maybe_spawn;
use super::state::GameState;
use crate::circles_overlap;
use crate::config::GameConfig;

/// Advance the run to host time `now_ms`
pub fn tick(state: &mut GameState, config: &GameConfig, now_ms: f64) {
    if !state.running {
        return;
    }
    debug_assert!(
        bound_violation(state.size_value, &config.player).is_none(),
        "size value {} out of bounds while running",
        state.size_value
    );

    let dt_ms = state
        .last_frame_ms
        .map_or(0.0, |last| (now_ms - last).max(0.0)) as f32;
    state.now_ms = now_ms;

    maybe_spawn(state, config);
    advance_player(&mut state.player, state.bounds, &config.player);
    step_balls(state, config, dt_ms);
    state.compact_balls();

    if state.running {
        step_vegetables(state, config);
    }
    update_explosions(state, config, dt_ms);
    update_particles(state, &config.particles, dt_ms);

    // Ending a run already froze the clock at the terminating frame
    if state.running {
        state.elapsed_ms = now_ms - state.start_ms;
    }
    state.last_frame_ms = Some(now_ms);
}

/// One pass over the active balls, back to front.
///
/// Removed balls keep their id in `state.balls` until the caller compacts,
/// so indices stay valid and dead ids are simply skipped.
fn step_balls(state: &mut GameState, config: &GameConfig, dt_ms: f32) {
    let bounds = state.bounds;
    let balls = &config.balls;

    for i in (0..state.balls.len()).rev() {
        let id = state.balls[i];
        let Some(ball) = state.ball_pool.get_mut(id) else {
            continue;
        };

        if advance_ball(ball, bounds, balls.offscreen_margin) == BallMotion::Culled {
            state.remove_ball(id);
            continue;
        }

        if tick_fuse(ball, dt_ms, &balls.blue) {
            detonate(state, config, id);
            continue;
        }

        let (pos, radius, is_blue) = (ball.pos, ball.radius, ball.kind.is_blue());
        if circles_overlap(state.player.pos, state.player.radius, pos, radius) {
            if player_eats_ball(state, config, id).is_some() {
                break;
            }
            continue;
        }

        if is_blue {
            if let Some(prey) = find_blue_prey(state, id) {
                blue_eats_ball(state, config, id, prey);
                continue;
            }
        }

        for j in (i + 1)..state.balls.len() {
            let other = state.balls[j];
            if let Some((a, b)) = state.ball_pool.get2_mut(id, other) {
                if balls_collide(a, b) {
                    resolve_elastic(a, b, balls.elasticity);
                }
            }
        }
    }
}

fn step_vegetables(state: &mut GameState, config: &GameConfig) {
    spin_vegetables(state, config);
    for i in (0..state.vegetables.len()).rev() {
        let veg = &state.vegetables[i];
        if circles_overlap(state.player.pos, state.player.radius, veg.pos, veg.radius)
            && player_eats_vegetable(state, config, i).is_some()
        {
            break;
        }
    }
}
