//! Ball and vegetable spawning
//!
//! Balls enter from just outside a random canvas edge and head roughly for
//! the centre. The spawn rate climbs linearly with run time.

use glam::Vec2;
use rand::Rng;

use super::state::{Ball, BallId, BallKind, BallType, GameState, Vegetable};
use crate::config::{BallConfig, GameConfig};

/// Pick a ball type from a single uniform roll in [0, 1).
///
/// Blue is checked first and only once the spawn delay has passed, then
/// green, and orange takes whatever is left. The thresholds overlap on
/// purpose: green's effective share shrinks once blue becomes possible.
pub fn choose_ball_type(roll: f32, elapsed_secs: f32, balls: &BallConfig) -> BallType {
    if elapsed_secs > balls.blue.spawn_delay_secs && roll < balls.blue.probability {
        BallType::Blue
    } else if roll < balls.green.probability {
        BallType::Green
    } else {
        BallType::Orange
    }
}

/// Current spawn rate in balls per second
pub fn spawn_rate(balls: &BallConfig, elapsed_secs: f32) -> f32 {
    balls.spawn_rate * (1.0 + elapsed_secs / balls.spawn_ramp_secs)
}

/// Milliseconds that must pass between spawns at the current rate
pub fn spawn_interval_ms(balls: &BallConfig, elapsed_secs: f32) -> f64 {
    1000.0 / spawn_rate(balls, elapsed_secs) as f64
}

fn color_for(ty: BallType, balls: &BallConfig) -> u32 {
    match ty {
        BallType::Orange => balls.orange.color,
        BallType::Green => balls.green.color,
        BallType::Blue => balls.blue.color,
    }
}

/// Spawn one ball. `ty` of `None` draws a type at random.
///
/// Returns `None` without touching the RNG when the ball cap is reached.
pub fn spawn_ball(
    state: &mut GameState,
    config: &GameConfig,
    ty: Option<BallType>,
) -> Option<BallId> {
    let balls = &config.balls;
    if state.active_ball_count() >= balls.max_count {
        return None;
    }

    let elapsed_secs = state.elapsed_secs();
    let bounds = state.bounds;
    let rng = &mut state.rng;
    let radius = if balls.max_radius > balls.min_radius {
        rng.random_range(balls.min_radius..balls.max_radius)
    } else {
        balls.min_radius
    };

    let ty = match ty {
        Some(ty) => ty,
        None => choose_ball_type(rng.random::<f32>(), elapsed_secs, balls),
    };

    let pos = match rng.random_range(0..4) {
        0 => Vec2::new(rng.random::<f32>() * bounds.width, -radius),
        1 => Vec2::new(bounds.width + radius, rng.random::<f32>() * bounds.height),
        2 => Vec2::new(rng.random::<f32>() * bounds.width, bounds.height + radius),
        _ => Vec2::new(-radius, rng.random::<f32>() * bounds.height),
    };

    let to_center = bounds.center() - pos;
    let angle = to_center.y.atan2(to_center.x);
    let speed = rng.random::<f32>() * balls.max_speed + balls.speed_floor;
    let jitter = Vec2::new(
        (rng.random::<f32>() - 0.5) * balls.direction_jitter,
        (rng.random::<f32>() - 0.5) * balls.direction_jitter,
    );
    let vel = Vec2::new(angle.cos(), angle.sin()) * speed + jitter;

    // Every field is written: a recycled slot may hold a spent blue ball
    let ball = Ball {
        pos,
        vel,
        radius,
        color: color_for(ty, balls),
        kind: BallKind::fresh(ty),
        glowing: ty == BallType::Blue,
    };
    let id = state.ball_pool.acquire();
    if let Some(slot) = state.ball_pool.get_mut(id) {
        *slot = ball;
    }
    state.balls.push(id);
    Some(id)
}

/// Spawn a ball if enough time has passed since the last one
pub fn maybe_spawn(state: &mut GameState, config: &GameConfig) -> Option<BallId> {
    let interval = spawn_interval_ms(&config.balls, state.elapsed_secs());
    if state.now_ms - state.last_spawn_ms > interval {
        state.last_spawn_ms = state.now_ms;
        return spawn_ball(state, config, None);
    }
    None
}

/// Drop a vegetable at `pos` with a random starting rotation
pub fn spawn_vegetable(state: &mut GameState, config: &GameConfig, pos: Vec2) {
    let rotation = state.rng.random::<f32>() * std::f32::consts::TAU;
    state.vegetables.push(Vegetable {
        pos,
        radius: config.vegetable.radius,
        rotation,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Bounds, Fuse};
    use proptest::prelude::*;

    fn running_state(config: &GameConfig, seed: u64) -> GameState {
        let mut state = GameState::new(config, seed, Bounds::new(800.0, 600.0));
        state.reset(config, 0.0);
        state
    }

    #[test]
    fn test_type_draw_order() {
        let balls = BallConfig::default();
        // Before the blue delay a tiny roll is green
        assert_eq!(choose_ball_type(0.001, 5.0, &balls), BallType::Green);
        // After the delay the same roll is blue
        assert_eq!(choose_ball_type(0.001, 11.0, &balls), BallType::Blue);
        // Between blue and green thresholds stays green
        assert_eq!(choose_ball_type(0.01, 11.0, &balls), BallType::Green);
        assert_eq!(choose_ball_type(0.5, 11.0, &balls), BallType::Orange);
        // Exactly at the delay is not yet past it
        assert_eq!(choose_ball_type(0.001, 10.0, &balls), BallType::Green);
    }

    #[test]
    fn test_spawn_rate_ramps() {
        let balls = BallConfig::default();
        assert_eq!(spawn_rate(&balls, 0.0), 2.0);
        assert_eq!(spawn_rate(&balls, 30.0), 4.0);
        assert!((spawn_interval_ms(&balls, 0.0) - 500.0).abs() < 1e-9);
        assert!(spawn_interval_ms(&balls, 60.0) < spawn_interval_ms(&balls, 30.0));
    }

    #[test]
    fn test_spawn_starts_just_outside_an_edge_heading_inward() {
        let config = GameConfig::default();
        let mut state = running_state(&config, 7);
        for _ in 0..50 {
            let id = spawn_ball(&mut state, &config, Some(BallType::Orange)).unwrap();
            let ball = state.ball(id).unwrap();
            let b = state.bounds;
            let on_edge = (ball.pos.y + ball.radius).abs() < 1e-3
                || (ball.pos.x - (b.width + ball.radius)).abs() < 1e-3
                || (ball.pos.y - (b.height + ball.radius)).abs() < 1e-3
                || (ball.pos.x + ball.radius).abs() < 1e-3;
            assert!(on_edge, "spawned at {:?}", ball.pos);

            // Travel direction is within the jitter of the centre direction
            let to_center = (b.center() - ball.pos).normalize();
            let ideal_speed_min = config.balls.speed_floor;
            let along = ball.vel.dot(to_center);
            assert!(along > ideal_speed_min - config.balls.direction_jitter);
        }
    }

    #[test]
    fn test_blue_spawn_is_fresh_and_glowing() {
        let config = GameConfig::default();
        let mut state = running_state(&config, 3);
        let id = spawn_ball(&mut state, &config, Some(BallType::Blue)).unwrap();
        let ball = state.ball(id).unwrap();
        assert!(ball.glowing);
        assert_eq!(ball.color, config.balls.blue.color);
        assert_eq!(ball.kind, BallKind::Blue { eaten_count: 0, fuse: Fuse::Idle });
    }

    #[test]
    fn test_recycled_slot_does_not_leak_blue_state() {
        let config = GameConfig::default();
        let mut state = running_state(&config, 3);
        let id = spawn_ball(&mut state, &config, Some(BallType::Blue)).unwrap();
        if let Some(ball) = state.ball_mut(id) {
            ball.kind = BallKind::Blue {
                eaten_count: 9,
                fuse: Fuse::Armed { remaining_ms: 100.0, pulse_phase: 3.0 },
            };
        }
        state.remove_ball(id);
        state.compact_balls();

        let again = spawn_ball(&mut state, &config, Some(BallType::Orange)).unwrap();
        assert_eq!(again.index(), id.index());
        let ball = state.ball(again).unwrap();
        assert_eq!(ball.kind, BallKind::Orange);
        assert!(!ball.glowing);
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut config = GameConfig::default();
        config.balls.max_count = 3;
        let mut state = running_state(&config, 1);
        for _ in 0..3 {
            assert!(spawn_ball(&mut state, &config, None).is_some());
        }
        assert!(spawn_ball(&mut state, &config, None).is_none());
        assert_eq!(state.balls.len(), 3);
    }

    #[test]
    fn test_maybe_spawn_waits_for_interval() {
        let config = GameConfig::default();
        let mut state = running_state(&config, 1);
        state.now_ms = 400.0;
        assert!(maybe_spawn(&mut state, &config).is_none());
        state.now_ms = 501.0;
        assert!(maybe_spawn(&mut state, &config).is_some());
        assert_eq!(state.last_spawn_ms, 501.0);
        state.now_ms = 700.0;
        assert!(maybe_spawn(&mut state, &config).is_none());
    }

    #[test]
    fn test_spawn_vegetable() {
        let config = GameConfig::default();
        let mut state = running_state(&config, 1);
        spawn_vegetable(&mut state, &config, Vec2::new(10.0, 20.0));
        let veg = &state.vegetables[0];
        assert_eq!(veg.pos, Vec2::new(10.0, 20.0));
        assert_eq!(veg.radius, config.vegetable.radius);
        assert!((0.0..std::f32::consts::TAU).contains(&veg.rotation));
    }

    proptest! {
        #[test]
        fn prop_spawn_never_exceeds_cap(seed in any::<u64>(), cap in 1usize..20, attempts in 0usize..40) {
            let mut config = GameConfig::default();
            config.balls.max_count = cap;
            let mut state = running_state(&config, seed);
            for _ in 0..attempts {
                spawn_ball(&mut state, &config, None);
                prop_assert!(state.active_ball_count() <= cap);
            }
        }

        #[test]
        fn prop_spawned_radius_in_range(seed in any::<u64>()) {
            let config = GameConfig::default();
            let mut state = running_state(&config, seed);
            for _ in 0..20 {
                let id = spawn_ball(&mut state, &config, None).unwrap();
                let r = state.ball(id).unwrap().radius;
                prop_assert!(r >= config.balls.min_radius && r <= config.balls.max_radius);
            }
        }
    }
}
