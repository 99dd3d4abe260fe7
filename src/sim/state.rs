//! Round state and core gameplay types

use serde::{Deserialize, Serialize};

use crate::consts::ROUND_SECONDS;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to press start
    Ready,
    /// Round in progress
    Playing,
    /// Round ended (timer ran out or aborted)
    GameOver,
}

/// One timed play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub duration_seconds: u32,
    pub remaining_seconds: u32,
    pub running: bool,
}

impl Default for Round {
    fn default() -> Self {
        Self::new(ROUND_SECONDS)
    }
}

impl Round {
    /// A fresh, not-yet-running round
    pub fn new(duration_seconds: u32) -> Self {
        Self {
            duration_seconds,
            remaining_seconds: duration_seconds,
            running: false,
        }
    }

    /// Count down one second. Returns the new remaining value.
    pub fn tick_second(&mut self) -> u32 {
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.running = false;
        }
        self.remaining_seconds
    }

    pub fn is_over(&self) -> bool {
        self.remaining_seconds == 0
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.duration_seconds - self.remaining_seconds
    }
}

/// Result of a tap on a hole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TapOutcome {
    /// Hole was active; +1 point
    Hit,
    /// Nothing there
    Miss,
    /// No round in progress
    NotRunning,
}

/// Final numbers for a finished round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: u32,
    pub duration_seconds: u32,
    /// Taps that hit nothing
    pub misses: u32,
}

impl RoundSummary {
    /// Hit ratio in [0, 1]; 0 when the player never tapped
    pub fn accuracy(&self) -> f64 {
        let taps = self.score + self.misses;
        if taps == 0 {
            0.0
        } else {
            self.score as f64 / taps as f64
        }
    }
}
