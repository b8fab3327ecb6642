//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host timestamps only enter through [`tick`]
//! - Seeded RNG only
//! - Stable iteration order (active list order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod events;
pub mod explosion;
pub mod outcome;
pub mod physics;
pub mod pool;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, balls_collide, circle_contact, resolve_elastic};
pub use events::GameEvent;
pub use explosion::detonate;
pub use outcome::{bound_violation, end_run};
pub use pool::{Handle, Pool};
pub use spawn::{choose_ball_type, spawn_ball, spawn_vegetable};
pub use state::{
    Ball, BallId, BallKind, BallType, Bounds, EndReason, Explosion, Fuse, GameState, Particle,
    Player, Vegetable,
};
pub use tick::tick;
