//! Game state and core simulation types
//!
//! One [`GameState`] exists per run. It is owned by the session controller
//! and handed to every simulation stage by `&mut`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::pool::{Handle, Pool};
use crate::config::GameConfig;

/// Stable reference to a pooled ball
pub type BallId = Handle;

/// Stable reference to a pooled particle
pub type ParticleId = Handle;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Size value went above the maximum
    TooLarge,
    /// Size value went below the minimum
    TooSmall,
}

/// Ball colour classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallType {
    Orange,
    Green,
    Blue,
}

/// Detonation fuse of a blue ball
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Fuse {
    #[default]
    Idle,
    /// Counting down; `pulse_phase` only drives the glow animation
    Armed { remaining_ms: f32, pulse_phase: f32 },
}

/// Ball kind with the blue-only lifecycle data attached.
///
/// Non-blue balls cannot carry an eaten count or fuse.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BallKind {
    #[default]
    Orange,
    Green,
    Blue { eaten_count: u32, fuse: Fuse },
}

impl BallKind {
    /// Fresh kind for a spawn of the given type
    pub fn fresh(ty: BallType) -> Self {
        match ty {
            BallType::Orange => BallKind::Orange,
            BallType::Green => BallKind::Green,
            BallType::Blue => BallKind::Blue {
                eaten_count: 0,
                fuse: Fuse::Idle,
            },
        }
    }

    pub fn ball_type(&self) -> BallType {
        match self {
            BallKind::Orange => BallType::Orange,
            BallKind::Green => BallType::Green,
            BallKind::Blue { .. } => BallType::Blue,
        }
    }

    pub fn is_blue(&self) -> bool {
        matches!(self, BallKind::Blue { .. })
    }

    pub fn eaten_count(&self) -> u32 {
        match self {
            BallKind::Blue { eaten_count, .. } => *eaten_count,
            _ => 0,
        }
    }

    /// Remaining fuse time, 0 when not armed
    pub fn explosion_timer(&self) -> f32 {
        match self {
            BallKind::Blue {
                fuse: Fuse::Armed { remaining_ms, .. },
                ..
            } => *remaining_ms,
            _ => 0.0,
        }
    }

    pub fn is_armed(&self) -> bool {
        matches!(
            self,
            BallKind::Blue {
                fuse: Fuse::Armed { .. },
                ..
            }
        )
    }
}

/// A moving ball
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// `0xRRGGBB`
    pub color: u32,
    pub kind: BallKind,
    /// Render a glow halo (blue balls)
    pub glowing: bool,
}

impl Ball {
    /// Pulse animation phase; 0 unless the fuse burns
    pub fn pulse_phase(&self) -> f32 {
        match self.kind {
            BallKind::Blue {
                fuse: Fuse::Armed { pulse_phase, .. },
                ..
            } => pulse_phase,
            _ => 0.0,
        }
    }
}

/// The player's circle
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub dragging: bool,
}

/// A vegetable left behind by a blast
#[derive(Debug, Clone, PartialEq)]
pub struct Vegetable {
    pub pos: Vec2,
    pub radius: f32,
    /// Render-only rotation (radians), grows every frame
    pub rotation: f32,
}

/// Expanding shock ring left by a detonation (visual record)
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub pos: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub color: u32,
    pub alpha: f32,
    pub age_ms: f32,
}

/// A debris particle (visual record)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: u32,
    pub alpha: f32,
    pub lifetime_ms: f32,
    pub age_ms: f32,
}

/// Visible play area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True once a point is more than `margin` outside any edge
    pub fn is_far_outside(&self, p: Vec2, margin: f32) -> bool {
        p.x < -margin || p.x > self.width + margin || p.y < -margin || p.y > self.height + margin
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub rng: Pcg32,
    pub running: bool,
    pub bounds: Bounds,
    /// Host timestamp the run started at (ms)
    pub start_ms: f64,
    /// Host timestamp of the frame being stepped (ms)
    pub now_ms: f64,
    /// Host timestamp of the previous frame, `None` before the first
    pub last_frame_ms: Option<f64>,
    /// Elapsed run time (ms), frozen once the run ends
    pub elapsed_ms: f64,
    pub last_spawn_ms: f64,
    pub size_value: i32,
    pub player: Player,
    pub ball_pool: Pool<Ball>,
    /// Active balls in spawn order
    pub balls: Vec<BallId>,
    pub vegetables: Vec<Vegetable>,
    pub explosions: Vec<Explosion>,
    pub particle_pool: Pool<Particle>,
    pub particles: Vec<ParticleId>,
    /// Final score in seconds once the run ends
    pub score: f64,
    pub end_reason: Option<EndReason>,
    /// Events raised this frame, drained by the session after the step
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Blank, not-yet-running state with pools sized from the config
    pub fn new(config: &GameConfig, seed: u64, bounds: Bounds) -> Self {
        let player_radius = config.player.radius_for(config.player.initial_size_value);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            running: false,
            bounds,
            start_ms: 0.0,
            now_ms: 0.0,
            last_frame_ms: None,
            elapsed_ms: 0.0,
            last_spawn_ms: 0.0,
            size_value: config.player.initial_size_value,
            player: Player {
                pos: bounds.center(),
                vel: Vec2::ZERO,
                radius: player_radius,
                dragging: false,
            },
            ball_pool: Pool::new(config.balls.max_count),
            balls: Vec::new(),
            vegetables: Vec::new(),
            explosions: Vec::new(),
            particle_pool: Pool::new(config.particles.pool_capacity),
            particles: Vec::new(),
            score: 0.0,
            end_reason: None,
            events: Vec::new(),
        }
    }

    /// Full reinitialisation for a new run. Pools keep their recycled slots.
    pub fn reset(&mut self, config: &GameConfig, now_ms: f64) {
        self.ball_pool.release_all();
        self.particle_pool.release_all();
        self.balls.clear();
        self.particles.clear();
        self.vegetables.clear();
        self.explosions.clear();
        self.events.clear();

        self.running = true;
        self.start_ms = now_ms;
        self.now_ms = now_ms;
        self.last_frame_ms = None;
        self.elapsed_ms = 0.0;
        self.last_spawn_ms = now_ms;
        self.score = 0.0;
        self.end_reason = None;

        self.size_value = config.player.initial_size_value;
        self.player = Player {
            pos: self.bounds.center(),
            vel: Vec2::ZERO,
            radius: config.player.radius_for(self.size_value),
            dragging: false,
        };
    }

    pub fn elapsed_secs(&self) -> f32 {
        (self.elapsed_ms / 1000.0) as f32
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.ball_pool.get(id)
    }

    pub fn ball_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.ball_pool.get_mut(id)
    }

    /// Balls still live this frame, in spawn order
    pub fn active_balls(&self) -> impl Iterator<Item = &Ball> {
        self.balls.iter().filter_map(|id| self.ball_pool.get(*id))
    }

    pub fn active_ball_count(&self) -> usize {
        self.ball_pool.live_count()
    }

    pub fn active_particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter_map(|id| self.particle_pool.get(*id))
    }

    /// Release a ball to the pool. Its id stays in `balls` until
    /// [`GameState::compact_balls`] runs, so iteration indices stay stable.
    pub fn remove_ball(&mut self, id: BallId) -> Option<Ball> {
        let ball = self.ball_pool.get(id).cloned()?;
        self.ball_pool.release(id);
        Some(ball)
    }

    /// Drop ids of released balls from the active list
    pub fn compact_balls(&mut self) {
        let pool = &self.ball_pool;
        self.balls.retain(|id| pool.is_live(*id));
    }

    /// Emit an event for the post-step observers
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blue_kind_has_no_lifecycle_data() {
        for ty in [BallType::Orange, BallType::Green] {
            let kind = BallKind::fresh(ty);
            assert_eq!(kind.eaten_count(), 0);
            assert_eq!(kind.explosion_timer(), 0.0);
            assert!(!kind.is_armed());
        }
        let blue = BallKind::fresh(BallType::Blue);
        assert!(blue.is_blue());
        assert_eq!(blue.eaten_count(), 0);
        assert!(!blue.is_armed());
    }

    #[test]
    fn test_remove_then_compact() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 1, Bounds::new(800.0, 600.0));
        let a = state.ball_pool.insert(Ball::default());
        let b = state.ball_pool.insert(Ball::default());
        state.balls.extend([a, b]);

        assert!(state.remove_ball(a).is_some());
        assert!(state.remove_ball(a).is_none());
        assert_eq!(state.balls.len(), 2);
        assert_eq!(state.active_ball_count(), 1);

        state.compact_balls();
        assert_eq!(state.balls, vec![b]);
    }

    #[test]
    fn test_reset_reinitialises_run() {
        let config = GameConfig::default();
        let mut state = GameState::new(&config, 1, Bounds::new(800.0, 600.0));
        let id = state.ball_pool.insert(Ball::default());
        state.balls.push(id);
        state.size_value = 33;
        state.running = false;
        state.score = 12.5;
        state.end_reason = Some(EndReason::TooLarge);

        state.reset(&config, 5000.0);
        assert!(state.running);
        assert!(state.balls.is_empty());
        assert_eq!(state.active_ball_count(), 0);
        assert_eq!(state.size_value, 0);
        assert_eq!(state.player.radius, 20.0);
        assert_eq!(state.player.pos, Vec2::new(400.0, 300.0));
        assert_eq!(state.start_ms, 5000.0);
        assert_eq!(state.score, 0.0);
        assert!(state.end_reason.is_none());
    }

    #[test]
    fn test_far_outside() {
        let bounds = Bounds::new(800.0, 600.0);
        assert!(!bounds.is_far_outside(Vec2::new(-100.0, 10.0), 100.0));
        assert!(bounds.is_far_outside(Vec2::new(950.0, 10.0), 100.0));
        assert!(bounds.is_far_outside(Vec2::new(10.0, -101.0), 100.0));
    }
}
