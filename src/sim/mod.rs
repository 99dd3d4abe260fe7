//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual clock only (the host advances time explicitly)
//! - Seeded RNG only
//! - One timer queue per round, cleared on stop/restart
//! - No rendering or platform dependencies

pub mod active;
pub mod clock;
pub mod difficulty;
pub mod game;
pub mod pattern;
pub mod scheduler;
pub mod state;

pub use active::{ActiveSet, ActiveSetChange, ActiveSetMode, StepAction};
pub use clock::{TimerId, TimerQueue};
pub use difficulty::{
    CycleTiming, DifficultyMultiplier, PatternWeights, base_spawn_delay_ms, base_visible_time_ms,
    progress_ratio, weighted_choice,
};
pub use game::Game;
pub use pattern::{SpawnPattern, SpawnStep};
pub use scheduler::{ActiveSetListener, SchedulerConfig, SchedulerPhase, SpawnEvent, SpawnScheduler};
pub use state::{GamePhase, Round, RoundSummary, TapOutcome};
