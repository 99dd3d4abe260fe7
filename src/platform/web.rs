//! Browser bindings
//!
//! The page owns rendering and the animation frame loop; it forwards elapsed
//! time and taps here and reads back the active holes.

use wasm_bindgen::prelude::*;

use crate::highscores::LocalLeaderboard;
use crate::leaderboard::record_local_score;
use crate::settings::Settings;
use crate::sim::{Game, TapOutcome};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Smackamoji starting...");
}

/// Game handle exported to JavaScript
#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    settings: Settings,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let settings = Settings::load();
        let seed = super::clock_seed();
        log::info!("Game initialized with seed: {}", seed);
        WebGame {
            game: Game::new(&settings, seed),
            settings,
        }
    }

    /// Start a round; false if one is running
    pub fn start(&mut self) -> bool {
        self.game.start()
    }

    /// Advance by `delta_ms`. Returns the final score when the round ends
    /// during this call, or -1.
    pub fn advance(&mut self, delta_ms: f64) -> i32 {
        let delta = delta_ms.max(0.0).round() as u64;
        match self.game.advance_by(delta) {
            Some(summary) => {
                self.record(summary.score);
                summary.score as i32
            }
            None => -1,
        }
    }

    /// Tap a hole; true on a hit
    pub fn tap(&mut self, hole: u32) -> bool {
        self.game.tap(hole as usize) == TapOutcome::Hit
    }

    pub fn abort(&mut self) {
        self.game.abort();
    }

    pub fn active_holes(&self) -> Vec<u32> {
        self.game.active_holes().into_iter().map(|h| h as u32).collect()
    }

    pub fn score(&self) -> u32 {
        self.game.score()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.game.remaining_seconds()
    }

    pub fn player_name(&self) -> Option<String> {
        self.settings.player_name.clone()
    }

    /// Returns false if the name is empty after trimming
    pub fn set_player_name(&mut self, name: &str) -> bool {
        match self.settings.set_player_name(name) {
            Ok(()) => {
                self.settings.save();
                true
            }
            Err(e) => {
                log::warn!("Error saving player name: {}", e);
                false
            }
        }
    }

    /// Local top scores as JSON
    pub fn local_scores_json(&self) -> String {
        serde_json::to_string(&LocalLeaderboard::load()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}

impl WebGame {
    /// Local table only; the page pushes to the cloud store itself
    fn record(&self, score: u32) {
        let Some(name) = self.settings.player_name.as_deref() else {
            return;
        };
        let mut local = LocalLeaderboard::load();
        if let Some(rank) = record_local_score(name, score, super::today(), &mut local) {
            log::info!("New local high score #{}", rank);
        }
    }
}
