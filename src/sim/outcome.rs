//! Size bookkeeping and run termination
//!
//! The size-bound check here is the only thing that ends a run. It runs
//! synchronously from whichever interaction changed the size value.

use super::events::GameEvent;
use super::state::{EndReason, GameState};
use crate::config::PlayerConfig;

/// Which bound, if any, a size value violates
pub fn bound_violation(size_value: i32, config: &PlayerConfig) -> Option<EndReason> {
    if size_value > config.max_size_value {
        Some(EndReason::TooLarge)
    } else if size_value < config.min_size_value {
        Some(EndReason::TooSmall)
    } else {
        None
    }
}

/// Apply a size change, recompute the player radius and end the run if the
/// new value is out of bounds. Returns the end reason when the run ended.
pub fn change_size(state: &mut GameState, config: &PlayerConfig, delta: i32) -> Option<EndReason> {
    state.size_value = state.size_value.saturating_add(delta);
    state.player.radius = config.radius_for(state.size_value);

    let reason = bound_violation(state.size_value, config)?;
    end_run(state, reason);
    Some(reason)
}

/// Freeze the run: stop the clock at the current frame and record the score
pub fn end_run(state: &mut GameState, reason: EndReason) {
    if !state.running {
        return;
    }
    state.running = false;
    state.player.dragging = false;
    state.elapsed_ms = (state.now_ms - state.start_ms).max(0.0);
    state.score = state.elapsed_ms / 1000.0;
    state.end_reason = Some(reason);

    log::info!(
        "Run ended ({:?}) after {:.1}s with size value {}",
        reason,
        state.score,
        state.size_value
    );
    state.emit(GameEvent::SessionEnded {
        final_score: state.score,
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::state::Bounds;

    fn running_state(config: &GameConfig) -> GameState {
        let mut state = GameState::new(config, 1, Bounds::new(800.0, 600.0));
        state.reset(config, 1000.0);
        state
    }

    #[test]
    fn test_bound_violation() {
        let p = PlayerConfig::default();
        assert_eq!(bound_violation(0, &p), None);
        assert_eq!(bound_violation(50, &p), None);
        assert_eq!(bound_violation(51, &p), Some(EndReason::TooLarge));
        assert_eq!(bound_violation(-1, &p), Some(EndReason::TooSmall));
    }

    #[test]
    fn test_change_size_updates_radius() {
        let config = GameConfig::default();
        let mut state = running_state(&config);
        assert_eq!(change_size(&mut state, &config.player, 5), None);
        assert_eq!(state.size_value, 5);
        assert_eq!(state.player.radius, 30.0);
        assert!(state.running);
    }

    #[test]
    fn test_change_size_past_min_ends_run() {
        let config = GameConfig::default();
        let mut state = running_state(&config);
        state.now_ms = 4500.0;
        assert_eq!(
            change_size(&mut state, &config.player, -1),
            Some(EndReason::TooSmall)
        );
        assert!(!state.running);
        assert_eq!(state.score, 3.5);
        assert_eq!(state.end_reason, Some(EndReason::TooSmall));
        assert_eq!(
            state.events,
            vec![GameEvent::SessionEnded {
                final_score: 3.5,
                reason: EndReason::TooSmall
            }]
        );
    }

    #[test]
    fn test_end_run_only_once() {
        let config = GameConfig::default();
        let mut state = running_state(&config);
        state.now_ms = 2000.0;
        end_run(&mut state, EndReason::TooLarge);
        state.now_ms = 9000.0;
        end_run(&mut state, EndReason::TooSmall);
        assert_eq!(state.score, 1.0);
        assert_eq!(state.end_reason, Some(EndReason::TooLarge));
        assert_eq!(state.events.len(), 1);
    }
}
