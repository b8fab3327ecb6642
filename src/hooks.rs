//! Collaborator seams
//!
//! The simulation core reports what happened through [`GameObserver`]s and
//! only ever reads from an [`AuthService`]. Both are optional: a session
//! with no observers runs the same game.

use glam::Vec2;

use crate::sim::{EndReason, GameEvent};

/// Post-step feedback hooks. Every method defaults to a no-op.
pub trait GameObserver {
    fn on_ball_eaten(&mut self, _pos: Vec2, _color: u32) {}

    fn on_vegetable_eaten(&mut self) {}

    fn on_explosion(&mut self, _pos: Vec2, _color: u32) {}

    /// `final_score` is the time survived in seconds
    fn on_session_end(&mut self, _final_score: f64, _reason: EndReason) {}
}

/// Read-only view of the host's login state
pub trait AuthService {
    fn is_authenticated(&self) -> bool;

    /// Name the leaderboard files a score under
    fn username(&self) -> Option<String> {
        None
    }
}

/// Auth backed by a fixed, optional username
#[derive(Debug, Clone, Default)]
pub struct FixedAuth {
    pub username: Option<String>,
}

impl FixedAuth {
    pub fn signed_in(name: impl Into<String>) -> Self {
        Self {
            username: Some(name.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl AuthService for FixedAuth {
    fn is_authenticated(&self) -> bool {
        self.username.is_some()
    }

    fn username(&self) -> Option<String> {
        self.username.clone()
    }
}

/// Observers in registration order
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Box<dyn GameObserver>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Hand every event to every observer, events outermost
    pub fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            for observer in &mut self.observers {
                match *event {
                    GameEvent::BallEaten { pos, color } => observer.on_ball_eaten(pos, color),
                    GameEvent::VegetableEaten { .. } => observer.on_vegetable_eaten(),
                    GameEvent::Explosion { pos, color, .. } => observer.on_explosion(pos, color),
                    GameEvent::SessionEnded {
                        final_score,
                        reason,
                    } => observer.on_session_end(final_score, reason),
                    // Blue ball growth has no collaborator hook
                    GameEvent::BlueAte { .. } | GameEvent::BlueArmed { .. } => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl GameObserver for Recorder {
        fn on_ball_eaten(&mut self, _pos: Vec2, color: u32) {
            self.log.borrow_mut().push(format!("{}:eat:{color:06X}", self.tag));
        }

        fn on_session_end(&mut self, final_score: f64, reason: EndReason) {
            self.log
                .borrow_mut()
                .push(format!("{}:end:{final_score}:{reason:?}", self.tag));
        }
    }

    /// Relies entirely on the default methods
    struct Silent;
    impl GameObserver for Silent {}

    #[test]
    fn test_dispatch_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = ObserverList::new();
        list.push(Box::new(Recorder { tag: "a", log: log.clone() }));
        list.push(Box::new(Silent));
        list.push(Box::new(Recorder { tag: "b", log: log.clone() }));
        assert_eq!(list.len(), 3);

        list.dispatch(&[
            GameEvent::BallEaten { pos: Vec2::ZERO, color: 0xF9A826 },
            GameEvent::BlueArmed { pos: Vec2::ZERO },
            GameEvent::SessionEnded { final_score: 2.5, reason: EndReason::TooSmall },
        ]);

        assert_eq!(
            *log.borrow(),
            vec![
                "a:eat:F9A826",
                "b:eat:F9A826",
                "a:end:2.5:TooSmall",
                "b:end:2.5:TooSmall",
            ]
        );
    }

    #[test]
    fn test_fixed_auth() {
        assert!(!FixedAuth::anonymous().is_authenticated());
        let auth = FixedAuth::signed_in("mika");
        assert!(auth.is_authenticated());
        assert_eq!(auth.username().as_deref(), Some("mika"));
    }
}
