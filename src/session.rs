//! Session / outcome controller
//!
//! Owns the one [`GameState`] of a run together with its config and the
//! observer list. Hosts drive it with [`Session::frame`] once per animation
//! callback and stop requesting frames when it returns false.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, GameConfig};
use crate::consts::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::hooks::{AuthService, GameObserver, ObserverList};
use crate::leaderboard::Leaderboard;
use crate::sim::physics::apply_drag;
use crate::sim::spawn::spawn_ball;
use crate::sim::{BallId, BallType, Bounds, EndReason, GameState, tick};

/// How a finished run went
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Time survived, seconds
    pub final_score_secs: f64,
    pub reason: EndReason,
}

impl Outcome {
    /// End-of-game line for the UI
    pub fn message(&self) -> &'static str {
        match self.reason {
            EndReason::TooLarge => "You ate too much and got too big to move!",
            EndReason::TooSmall => "You shrank away to nothing!",
        }
    }
}

pub struct Session {
    config: GameConfig,
    state: GameState,
    observers: ObserverList,
}

impl Session {
    /// Validate `config` and build an idle session
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = GameState::new(
            &config,
            seed,
            Bounds::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
        );
        Ok(Self {
            config,
            state,
            observers: ObserverList::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for hosts scripting a scenario
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn add_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Begin a fresh run on a `width` x `height` canvas
    pub fn start(&mut self, now_ms: f64, width: f32, height: f32) {
        self.state.bounds = Bounds::new(width, height);
        self.state.reset(&self.config, now_ms);
        for _ in 0..self.config.balls.initial_count {
            spawn_ball(&mut self.state, &self.config, None);
        }
        log::info!(
            "Run started on {}x{} canvas with {} balls",
            width,
            height,
            self.state.active_ball_count()
        );
    }

    /// Step one frame and notify observers.
    ///
    /// Returns whether the run is still going. Once it is over this returns
    /// false without touching anything.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if !self.state.running {
            return false;
        }
        tick(&mut self.state, &self.config, now_ms);

        self.observers.dispatch(&self.state.events);
        self.state.events.clear();
        self.state.running
    }

    /// Force a ball in, e.g. from a debug key. Refused once the run is over.
    pub fn spawn_ball(&mut self, ty: Option<BallType>) -> Option<BallId> {
        if !self.state.running {
            return None;
        }
        spawn_ball(&mut self.state, &self.config, ty)
    }

    /// Start a drag if the pointer landed on the player. Returns true when
    /// a drag began.
    pub fn pointer_down(&mut self, pos: Vec2) -> bool {
        if !self.state.running {
            return false;
        }
        let player = &mut self.state.player;
        if pos.distance(player.pos) < player.radius {
            player.dragging = true;
        }
        player.dragging
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        if self.state.running {
            apply_drag(&mut self.state.player, pos, &self.config.player);
        }
    }

    pub fn pointer_up(&mut self) {
        self.state.player.dragging = false;
    }

    /// Canvas changed size. A running player is put back in the middle.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.bounds = Bounds::new(width, height);
        if self.state.running {
            self.state.player.pos = self.state.bounds.center();
        }
    }

    /// Seconds survived so far (frozen once the run is over)
    pub fn elapsed_secs(&self) -> f64 {
        self.state.elapsed_ms / 1000.0
    }

    pub fn size_value(&self) -> i32 {
        self.state.size_value
    }

    /// Final result once the run has ended
    pub fn outcome(&self) -> Option<Outcome> {
        if self.state.running {
            return None;
        }
        self.state.end_reason.map(|reason| Outcome {
            final_score_secs: self.state.score,
            reason,
        })
    }

    /// A finished run's score may be submitted by a signed-in user
    pub fn can_submit_score(&self, auth: &dyn AuthService) -> bool {
        self.outcome().is_some() && auth.is_authenticated()
    }

    /// Post the finished run to `board`. Returns the rank on success.
    pub fn submit_score(
        &self,
        board: &mut Leaderboard,
        auth: &dyn AuthService,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.can_submit_score(auth) {
            return None;
        }
        let outcome = self.outcome()?;
        board.submit(auth, outcome.final_score_secs, timestamp)
    }
}
