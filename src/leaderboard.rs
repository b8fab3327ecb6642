//! Survival-time leaderboard
//!
//! One entry per user holding that user's best run. Persisted to
//! LocalStorage on the web, in memory only on native.

use serde::{Deserialize, Serialize};

use crate::hooks::AuthService;

/// Maximum number of entries shown
pub const MAX_ENTRIES: usize = 10;

/// A user's best run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    /// Seconds survived
    pub score: f64,
    /// Unix timestamp (ms) of the best run
    pub timestamp: f64,
}

/// Best scores, sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "foodie_balls_leaderboard";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record `score` for the signed-in user.
    ///
    /// Anonymous callers are refused. A user's entry only ever improves.
    /// Returns the user's 1-based rank afterwards, or `None` if refused or
    /// the user sits outside the top [`MAX_ENTRIES`].
    pub fn submit(&mut self, auth: &dyn AuthService, score: f64, timestamp: f64) -> Option<usize> {
        if !auth.is_authenticated() || !score.is_finite() {
            return None;
        }
        let username = auth.username()?;

        match self.entries.iter_mut().find(|e| e.username == username) {
            Some(entry) => {
                if score > entry.score {
                    entry.score = score;
                    entry.timestamp = timestamp;
                }
            }
            None => self.entries.push(LeaderboardEntry {
                username: username.clone(),
                score,
                timestamp,
            }),
        }

        self.entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        let rank = self.rank_of(&username);
        self.entries.truncate(MAX_ENTRIES);
        rank.filter(|r| *r <= MAX_ENTRIES)
    }

    /// 1-based position of `username`, if listed
    pub fn rank_of(&self, username: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.username == username)
            .map(|i| i + 1)
    }

    pub fn best_for(&self, username: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.username == username)
            .map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<f64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the leaderboard from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Leaderboard>(&json) {
                    Ok(board) => {
                        log::info!("Loaded {} leaderboard entries", board.entries.len());
                        return board;
                    }
                    Err(e) => log::warn!("Discarding unreadable leaderboard: {}", e),
                }
            }
        }

        log::info!("No leaderboard found, starting fresh");
        Self::new()
    }

    /// Save the leaderboard to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Leaderboard saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
