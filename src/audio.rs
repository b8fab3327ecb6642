//! Audio feedback using the Web Audio API
//!
//! Sounds are synthesised from oscillators, so there are no asset files.
//! [`SharedAudio`] plugs the manager into a session as an observer while the
//! page keeps a handle for the mute toggle.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::hooks::GameObserver;
use crate::sim::EndReason;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Player swallowed a ball
    Eat,
    /// Player swallowed a vegetable
    Vegetable,
    /// Blue ball detonated
    Explosion,
    /// Run over
    GameOver,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Fails outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Flip mute and return the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Eat => self.play_eat(ctx, vol),
            SoundEffect::Vegetable => self.play_vegetable(ctx, vol),
            SoundEffect::Explosion => self.play_explosion(ctx, vol),
            SoundEffect::GameOver => self.play_game_over(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Eat - short pop with a little random pitch and level so rapid
    /// eating does not sound mechanical
    fn play_eat(&self, ctx: &AudioContext, vol: f32) {
        let pitch = 0.8 + js_sys::Math::random() as f32 * 0.4;
        let level = 0.3 + js_sys::Math::random() as f32 * 0.3;
        let Some((osc, gain)) = self.create_osc(ctx, 500.0 * pitch, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * level, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.08)
            .ok();
        osc.frequency().set_value_at_time(500.0 * pitch, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(900.0 * pitch, t + 0.06)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Vegetable - bright ding
    fn play_vegetable(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [880.0, 1320.0].iter().enumerate() {
            let delay = i as f64 * 0.06;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.35, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.45).ok();
            }
        }
    }

    /// Explosion - boom!
    fn play_explosion(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.4)
            .ok();
        osc.frequency().set_value_at_time(100.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(30.0, t + 0.4)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();

        // High frequency crack
        if let Some((osc2, gain2)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
            gain2.gain().set_value_at_time(vol * 0.2, t).ok();
            gain2
                .gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc2.start().ok();
            osc2.stop_with_when(t + 0.15).ok();
        }
    }

    /// Game over - falling tones
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
            let delay = i as f64 * 0.2;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }
}

impl GameObserver for AudioManager {
    fn on_ball_eaten(&mut self, _pos: Vec2, _color: u32) {
        self.play(SoundEffect::Eat);
    }

    fn on_vegetable_eaten(&mut self) {
        self.play(SoundEffect::Vegetable);
    }

    fn on_explosion(&mut self, _pos: Vec2, _color: u32) {
        self.play(SoundEffect::Explosion);
    }

    fn on_session_end(&mut self, _final_score: f64, _reason: EndReason) {
        self.play(SoundEffect::GameOver);
    }
}

/// Audio manager shared between the session and the page controls
#[derive(Clone, Default)]
pub struct SharedAudio(pub Rc<RefCell<AudioManager>>);

impl GameObserver for SharedAudio {
    fn on_ball_eaten(&mut self, pos: Vec2, color: u32) {
        self.0.borrow_mut().on_ball_eaten(pos, color);
    }

    fn on_vegetable_eaten(&mut self) {
        self.0.borrow_mut().on_vegetable_eaten();
    }

    fn on_explosion(&mut self, pos: Vec2, color: u32) {
        self.0.borrow_mut().on_explosion(pos, color);
    }

    fn on_session_end(&mut self, final_score: f64, reason: EndReason) {
        self.0.borrow_mut().on_session_end(final_score, reason);
    }
}
