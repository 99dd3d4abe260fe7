//! Game settings and player profile
//!
//! Persisted separately from the leaderboard in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{NUM_HOLES, ROUND_SECONDS};
use crate::leaderboard::{LeaderboardError, normalize_name};
use crate::platform::storage;
use crate::sim::ActiveSetMode;

/// Shortest allowed round
pub const MIN_ROUND_SECONDS: u32 = 1;
/// Longest allowed round
pub const MAX_ROUND_SECONDS: u32 = 300;
/// Largest supported board
pub const MAX_HOLES: usize = 64;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Round length in seconds
    pub round_seconds: u32,
    /// Holes on the board
    pub holes: usize,
    /// Whether several moles can be up at once
    pub active_set_mode: ActiveSetMode,
    /// Name shown on the leaderboard
    pub player_name: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            round_seconds: ROUND_SECONDS,
            holes: NUM_HOLES,
            active_set_mode: ActiveSetMode::Shared,
            player_name: None,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "smackamoji_settings";

    /// Copy with round length and board size clamped to supported ranges
    pub fn validated(&self) -> Self {
        Self {
            round_seconds: self.round_seconds.clamp(MIN_ROUND_SECONDS, MAX_ROUND_SECONDS),
            holes: self.holes.clamp(1, MAX_HOLES),
            ..self.clone()
        }
    }

    /// Set the player name (trimmed, capped at 20 characters)
    pub fn set_player_name(&mut self, name: &str) -> Result<(), LeaderboardError> {
        self.player_name = Some(normalize_name(name)?);
        Ok(())
    }

    pub fn clear_player_name(&mut self) {
        self.player_name = None;
    }

    /// Whether the name entry screen needs to be shown
    pub fn needs_player_name(&self) -> bool {
        self.player_name.is_none()
    }

    /// Load settings from storage, falling back to defaults
    pub fn load() -> Self {
        match storage::load_json::<Settings>(Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings.validated()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if storage::save_json(Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}
