//! Blue ball fuse and detonation
//!
//! A blue ball goes `Idle -> Armed -> detonated`. Arming happens in
//! [`super::collision::blue_eats_ball`]; this module burns the fuse down and
//! performs the blast.

use glam::Vec2;
use rand::Rng;

use super::events::GameEvent;
use super::spawn::spawn_vegetable;
use super::state::{Ball, BallId, BallKind, Explosion, Fuse, GameState, Particle};
use crate::config::{BlueConfig, GameConfig};

/// Burn an armed fuse down by `dt_ms` and advance its pulse.
///
/// Returns true once the fuse has reached zero and the ball must detonate.
pub fn tick_fuse(ball: &mut Ball, dt_ms: f32, config: &BlueConfig) -> bool {
    let BallKind::Blue {
        fuse: Fuse::Armed {
            remaining_ms,
            pulse_phase,
        },
        ..
    } = &mut ball.kind
    else {
        return false;
    };
    *remaining_ms -= dt_ms;
    *pulse_phase += dt_ms * config.pulse_rate;
    *remaining_ms <= 0.0
}

/// Blow up the blue ball `id`.
///
/// Every other ball whose centre is strictly inside the blast radius is
/// removed, then the ball itself. A vegetable is left behind only if the
/// blast took at least one other ball. Returns the number of balls removed
/// by the blast (not counting the detonating ball).
pub fn detonate(state: &mut GameState, config: &GameConfig, id: BallId) -> usize {
    let Some(ball) = state.remove_ball(id) else {
        return 0;
    };
    let center = ball.pos;
    let blast = config.explosion.radius;

    // Released ids stay in the active list until compaction, so indices hold
    let mut removed = 0;
    for i in 0..state.balls.len() {
        let other = state.balls[i];
        let inside = state
            .ball(other)
            .is_some_and(|b| b.pos.distance(center) < blast);
        if inside {
            state.remove_ball(other);
            removed += 1;
        }
    }

    state.explosions.push(Explosion {
        pos: center,
        radius: config.explosion.start_radius,
        max_radius: blast,
        color: ball.color,
        alpha: 1.0,
        age_ms: 0.0,
    });
    emit_particles(state, config, center, ball.color);

    if removed > 0 {
        spawn_vegetable(state, config, center);
    }

    log::debug!(
        "Detonation at ({:.0}, {:.0}) removed {} balls",
        center.x,
        center.y,
        removed
    );
    state.emit(GameEvent::Explosion {
        pos: center,
        color: ball.color,
        removed,
    });
    removed
}

/// Scatter debris. Stops early once the particle pool capacity is reached.
fn emit_particles(state: &mut GameState, config: &GameConfig, pos: Vec2, color: u32) {
    let cap = state.particle_pool.capacity();
    for _ in 0..config.explosion.particle_count {
        if state.particle_pool.live_count() >= cap {
            break;
        }
        let rng = &mut state.rng;
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let speed: f32 = rng.random_range(2.0..7.0);
        let particle = Particle {
            pos,
            vel: Vec2::from_angle(angle) * speed,
            size: rng.random_range(2.0..10.0),
            color,
            alpha: 1.0,
            lifetime_ms: rng.random_range(500.0..1500.0),
            age_ms: 0.0,
        };
        let pid = state.particle_pool.insert(particle);
        state.particles.push(pid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BallType, Bounds};

    fn running_state(config: &GameConfig) -> GameState {
        let mut state = GameState::new(config, 9, Bounds::new(800.0, 600.0));
        state.reset(config, 0.0);
        state
    }

    fn add(state: &mut GameState, pos: Vec2, kind: BallKind) -> BallId {
        let id = state.ball_pool.insert(Ball {
            pos,
            vel: Vec2::ZERO,
            radius: 8.0,
            color: 0x3B82F6,
            kind,
            glowing: kind.is_blue(),
        });
        state.balls.push(id);
        id
    }

    fn armed(remaining_ms: f32) -> BallKind {
        BallKind::Blue {
            eaten_count: 10,
            fuse: Fuse::Armed {
                remaining_ms,
                pulse_phase: 0.0,
            },
        }
    }

    #[test]
    fn test_idle_fuse_never_fires() {
        let config = BlueConfig::default();
        let mut ball = Ball {
            kind: BallKind::fresh(BallType::Blue),
            ..Default::default()
        };
        assert!(!tick_fuse(&mut ball, 10_000.0, &config));
        let mut orange = Ball::default();
        assert!(!tick_fuse(&mut orange, 10_000.0, &config));
    }

    #[test]
    fn test_fuse_counts_down_and_pulses() {
        let config = BlueConfig::default();
        let mut ball = Ball {
            kind: armed(2000.0),
            ..Default::default()
        };
        assert!(!tick_fuse(&mut ball, 1500.0, &config));
        assert_eq!(ball.kind.explosion_timer(), 500.0);
        assert!((ball.pulse_phase() - 15.0).abs() < 1e-4);
        assert!(tick_fuse(&mut ball, 500.0, &config));
    }

    #[test]
    fn test_detonation_clears_radius_and_leaves_vegetable() {
        let config = GameConfig::default();
        let mut state = running_state(&config);
        let center = Vec2::new(400.0, 300.0);
        let blue = add(&mut state, center, armed(0.0));
        let near = add(&mut state, center + Vec2::new(50.0, 0.0), BallKind::Orange);
        let near_blue = add(&mut state, center + Vec2::new(0.0, -99.0), BallKind::fresh(BallType::Blue));
        let edge = add(&mut state, center + Vec2::new(100.0, 0.0), BallKind::Green);
        let far = add(&mut state, center + Vec2::new(300.0, 0.0), BallKind::Orange);

        assert_eq!(detonate(&mut state, &config, blue), 2);
        state.compact_balls();

        assert!(!state.ball_pool.is_live(blue));
        assert!(!state.ball_pool.is_live(near));
        assert!(!state.ball_pool.is_live(near_blue));
        // Exactly on the rim survives
        assert!(state.ball_pool.is_live(edge));
        assert!(state.ball_pool.is_live(far));
        assert_eq!(state.balls, vec![edge, far]);

        assert_eq!(state.vegetables.len(), 1);
        assert_eq!(state.vegetables[0].pos, center);
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.particles.len(), config.explosion.particle_count);
        assert!(state.events.contains(&GameEvent::Explosion {
            pos: center,
            color: 0x3B82F6,
            removed: 2
        }));
    }

    #[test]
    fn test_lonely_detonation_leaves_no_vegetable() {
        let config = GameConfig::default();
        let mut state = running_state(&config);
        let blue = add(&mut state, Vec2::new(100.0, 100.0), armed(0.0));
        assert_eq!(detonate(&mut state, &config, blue), 0);
        state.compact_balls();
        assert!(state.balls.is_empty());
        assert!(state.vegetables.is_empty());
        assert_eq!(state.explosions.len(), 1);
    }

    #[test]
    fn test_particles_capped_by_pool_capacity() {
        let mut config = GameConfig::default();
        config.particles.pool_capacity = 30;
        let mut state = running_state(&config);
        let blue = add(&mut state, Vec2::new(100.0, 100.0), armed(0.0));
        detonate(&mut state, &config, blue);
        assert_eq!(state.particles.len(), 30);
        for p in state.active_particles() {
            assert!((2.0..10.0).contains(&p.size));
            assert!((500.0..1500.0).contains(&p.lifetime_ms));
        }
    }

    #[test]
    fn test_detonating_dead_ball_is_noop() {
        let config = GameConfig::default();
        let mut state = running_state(&config);
        let blue = add(&mut state, Vec2::ZERO, armed(0.0));
        state.remove_ball(blue);
        assert_eq!(detonate(&mut state, &config, blue), 0);
        assert!(state.explosions.is_empty());
    }
}
