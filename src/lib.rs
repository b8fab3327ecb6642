//! Foodie Balls - A browser arcade game about eating the right things
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, collisions, blue-ball blasts)
//! - `session`: Session/outcome controller that owns the simulation state
//! - `config`: Data-driven game balance
//! - `hooks`: Collaborator callbacks (effects, audio, auth)
//! - `leaderboard`: Per-user best times

pub mod config;
pub mod hooks;
pub mod leaderboard;
pub mod session;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use config::{ConfigError, GameConfig};
pub use hooks::{AuthService, GameObserver};
pub use leaderboard::Leaderboard;
pub use session::{Outcome, Session};

use glam::Vec2;

/// Default tuning values (the shipped game balance)
pub mod consts {
    /// Player size value bounds; leaving them ends the run
    pub const INITIAL_SIZE_VALUE: i32 = 0;
    pub const MIN_SIZE_VALUE: i32 = 0;
    pub const MAX_SIZE_VALUE: i32 = 50;
    /// Player radius = BASE_RADIUS + size_value * SIZE_SCALE
    pub const PLAYER_BASE_RADIUS: f32 = 20.0;
    pub const PLAYER_SIZE_SCALE: f32 = 2.0;
    /// Velocity added per unit of pointer distance while dragging
    pub const PLAYER_DRAG_ACCEL: f32 = 0.2;
    /// Per-frame velocity decay
    pub const PLAYER_FRICTION: f32 = 0.95;

    /// Ball radius range for freshly spawned balls
    pub const BALL_MIN_RADIUS: f32 = 5.0;
    pub const BALL_MAX_RADIUS: f32 = 15.0;
    /// Spawn speed is uniform in [SPEED_FLOOR, SPEED_FLOOR + MAX_SPEED)
    pub const BALL_MAX_SPEED: f32 = 2.0;
    pub const BALL_SPEED_FLOOR: f32 = 0.5;
    /// Per-axis velocity jitter, uniform in [-JITTER/2, JITTER/2)
    pub const BALL_DIRECTION_JITTER: f32 = 1.0;
    pub const BALL_INITIAL_COUNT: usize = 20;
    pub const BALL_MAX_COUNT: usize = 500;
    /// Balls per second at the start of a run
    pub const BALL_SPAWN_RATE: f32 = 2.0;
    /// Seconds for the spawn rate to grow by one base rate
    pub const BALL_SPAWN_RAMP_SECS: f32 = 30.0;
    /// Distance past the canvas edge at which a ball is culled
    pub const OFFSCREEN_MARGIN: f32 = 100.0;
    /// Impulse multiplier for ball-ball bounces (>1 is deliberately bouncy)
    pub const ELASTICITY: f32 = 1.5;

    pub const ORANGE_COLOR: u32 = 0xF9A826;
    pub const ORANGE_SCORE_IMPACT: i32 = 1;
    pub const GREEN_COLOR: u32 = 0x4ADE80;
    pub const GREEN_PROBABILITY: f32 = 0.02;
    pub const GREEN_SCORE_IMPACT: i32 = -1;
    pub const BLUE_COLOR: u32 = 0x3B82F6;
    pub const BLUE_PROBABILITY: f32 = 0.005;
    /// Seconds before the first blue ball may appear
    pub const BLUE_SPAWN_DELAY_SECS: f32 = 10.0;
    /// Balls a blue ball must eat before its fuse is lit
    pub const BLUE_EAT_THRESHOLD: u32 = 10;
    pub const BLUE_GROWTH_PER_EAT: f32 = 2.0;
    pub const BLUE_MAX_RADIUS: f32 = 50.0;
    pub const BLUE_DETONATION_DELAY_MS: f32 = 2000.0;
    /// Pulse phase advance per millisecond while the fuse burns
    pub const BLUE_PULSE_RATE: f32 = 0.01;

    pub const VEGETABLE_RADIUS: f32 = 25.0;
    pub const VEGETABLE_SCORE_IMPACT: i32 = -20;
    /// Radians per frame
    pub const VEGETABLE_SPIN: f32 = 0.01;

    pub const EXPLOSION_RADIUS: f32 = 100.0;
    pub const EXPLOSION_DURATION_MS: f32 = 500.0;
    pub const EXPLOSION_PARTICLES: usize = 50;
    /// Starting radius of the expanding shock ring
    pub const EXPLOSION_START_RADIUS: f32 = 10.0;

    pub const PARTICLE_POOL_CAPACITY: usize = 1000;
    pub const PARTICLE_GRAVITY: f32 = 0.1;
    pub const PARTICLE_DRAG: f32 = 0.98;

    /// Canvas used until the host reports its real size
    pub const DEFAULT_CANVAS_WIDTH: f32 = 800.0;
    pub const DEFAULT_CANVAS_HEIGHT: f32 = 600.0;
}

/// Strict circle overlap test: touching circles do not collide
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// CSS colour string for a `0xRRGGBB` colour
pub fn css_color(color: u32) -> String {
    format!("#{:06X}", color & 0xFF_FFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touching_circles_do_not_overlap() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(!circles_overlap(a, 5.0, b, 5.0));
        assert!(circles_overlap(a, 5.0, b, 5.01));
    }

    #[test]
    fn test_color_helpers() {
        assert_eq!(css_color(0x3B82F6), "#3B82F6");
        assert_eq!(css_color(0x00000A), "#00000A");
    }
}
