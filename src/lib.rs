//! Smackamoji - A 30 second whack-a-mole arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawn scheduler, round driver, scoring)
//! - `highscores`: Local top-10 leaderboard
//! - `leaderboard`: Cloud leaderboard client with validation and retry
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Persisted player preferences

pub mod highscores;
pub mod leaderboard;
pub mod platform;
pub mod settings;
pub mod sim;

pub use highscores::LocalLeaderboard;
pub use leaderboard::{CloudLeaderboard, LeaderboardError, MemoryScoreStore, ScoreStore};
pub use settings::Settings;
pub use sim::{ActiveSetMode, Game, SpawnScheduler};

/// Game configuration constants
pub mod consts {
    /// Round length in seconds
    pub const ROUND_SECONDS: u32 = 30;
    /// Holes on the board (4x4 grid)
    pub const NUM_HOLES: usize = 16;
    /// Board columns, used only for display
    pub const BOARD_COLUMNS: usize = 4;

    /// Spawn delay at the start of a round (ms)
    pub const MAX_SPAWN_DELAY_MS: f64 = 2000.0;
    /// Spawn delay never drops below this before the multiplier (ms)
    pub const MIN_SPAWN_DELAY_MS: f64 = 800.0;
    /// How much the spawn delay shrinks over a full round (ms)
    pub const SPAWN_DELAY_RAMP_MS: f64 = 1200.0;

    /// Visible time at the start of a round (ms)
    pub const MAX_VISIBLE_MS: f64 = 1000.0;
    /// Visible time never drops below this before the multiplier (ms)
    pub const MIN_VISIBLE_MS: f64 = 500.0;
    /// How much the visible time shrinks over a full round (ms)
    pub const VISIBLE_RAMP_MS: f64 = 500.0;
    /// Hard floor on visible time after the multiplier (ms)
    pub const VISIBLE_FLOOR_MS: f64 = 350.0;

    /// Progress past which the multiplier range narrows
    pub const LATE_GAME_PROGRESS: f64 = 0.8;

    /// Fake-out decoy flash duration range (ms, half-open)
    pub const FAKE_OUT_FLASH_MS: (u64, u64) = (120, 200);
    /// Empty gap between decoy and real mole (ms, half-open)
    pub const FAKE_OUT_GAP_MS: (u64, u64) = (50, 150);
    /// Minimum hold per hole in a rapid-fire burst (ms)
    pub const RAPID_FIRE_MIN_HOLD_MS: u64 = 300;
    /// Minimum time per hole in a multi-mole shuffle (ms)
    pub const MULTI_MOLE_MIN_INTERVAL_MS: u64 = 100;
    /// Full passes through the holes in a multi-mole shuffle
    pub const MULTI_MOLE_PASSES: usize = 3;

    /// Longest player name stored anywhere
    pub const MAX_NAME_LEN: usize = 20;
    /// Highest score the cloud store accepts
    pub const MAX_CLOUD_SCORE: u32 = 1000;
}
