//! Events raised during a simulation step
//!
//! The simulation never calls collaborators directly. It records what
//! happened and the session hands the list to its observers once the step
//! has fully completed.

use glam::Vec2;

use super::state::EndReason;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The player ate a ball
    BallEaten { pos: Vec2, color: u32 },
    /// The player ate a vegetable
    VegetableEaten { pos: Vec2 },
    /// A blue ball ate another ball
    BlueAte { pos: Vec2, eaten_count: u32 },
    /// A blue ball reached its eat threshold and lit its fuse
    BlueArmed { pos: Vec2 },
    /// A blue ball detonated
    Explosion { pos: Vec2, color: u32, removed: usize },
    /// The run ended
    SessionEnded { final_score: f64, reason: EndReason },
}
