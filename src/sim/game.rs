//! Round driver
//!
//! Owns the countdown, feeds the spawn scheduler one `tick` per second,
//! stops it exactly once when time runs out, and scores taps.

use super::active::ActiveSetChange;
use super::scheduler::{SchedulerConfig, SpawnScheduler};
use super::state::{GamePhase, Round, RoundSummary, TapOutcome};
use crate::settings::Settings;

const MS_PER_SECOND: u64 = 1000;

/// A game session: one round at a time
#[derive(Debug)]
pub struct Game {
    round: Round,
    scheduler: SpawnScheduler,
    phase: GamePhase,
    score: u32,
    misses: u32,
    /// Milliseconds into the current countdown second
    second_elapsed_ms: u64,
    last_summary: Option<RoundSummary>,
}

impl Game {
    pub fn new(settings: &Settings, seed: u64) -> Self {
        let settings = settings.validated();
        let config = SchedulerConfig {
            holes: settings.holes,
            mode: settings.active_set_mode,
        };
        Self {
            round: Round::new(settings.round_seconds),
            scheduler: SpawnScheduler::new(config, seed),
            phase: GamePhase::Ready,
            score: 0,
            misses: 0,
            second_elapsed_ms: 0,
            last_summary: None,
        }
    }

    /// Forward active-set transitions to a renderer
    pub fn on_active_set_changed<F>(&mut self, listener: F)
    where
        F: FnMut(&ActiveSetChange) + 'static,
    {
        self.scheduler.on_active_set_changed(listener);
    }

    /// Start a new round. Returns false if one is already in progress.
    pub fn start(&mut self) -> bool {
        if self.phase == GamePhase::Playing {
            return false;
        }
        let duration = self.round.duration_seconds;
        self.round = Round::new(duration);
        self.round.running = true;
        self.score = 0;
        self.misses = 0;
        self.second_elapsed_ms = 0;
        self.last_summary = None;
        self.phase = GamePhase::Playing;

        self.scheduler.start(duration);
        self.scheduler.tick(duration);
        log::info!("Round started ({}s)", duration);
        true
    }

    /// Advance virtual time. Returns the summary if the round ended during
    /// this step.
    pub fn advance_by(&mut self, mut delta_ms: u64) -> Option<RoundSummary> {
        if self.phase != GamePhase::Playing {
            self.scheduler.advance_by(delta_ms);
            return None;
        }

        while delta_ms > 0 {
            let to_next_second = MS_PER_SECOND - self.second_elapsed_ms;
            if delta_ms < to_next_second {
                self.scheduler.advance_by(delta_ms);
                self.second_elapsed_ms += delta_ms;
                break;
            }

            self.scheduler.advance_by(to_next_second);
            delta_ms -= to_next_second;
            self.second_elapsed_ms = 0;

            let remaining = self.round.tick_second();
            self.scheduler.tick(remaining);
            if self.round.is_over() {
                return Some(self.finish());
            }
        }
        None
    }

    /// Abort the round early. No summary is produced.
    pub fn abort(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.scheduler.stop();
        self.round.running = false;
        self.phase = GamePhase::GameOver;
        log::info!("Round aborted with {}s left", self.round.remaining_seconds);
    }

    /// Player tapped `hole`
    pub fn tap(&mut self, hole: usize) -> TapOutcome {
        if self.phase != GamePhase::Playing {
            return TapOutcome::NotRunning;
        }
        if self.scheduler.whack(hole) {
            self.score += 1;
            TapOutcome::Hit
        } else {
            self.misses += 1;
            TapOutcome::Miss
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.round.remaining_seconds
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn active_holes(&self) -> Vec<usize> {
        self.scheduler.active_holes()
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    /// Summary of the last completed round
    pub fn last_summary(&self) -> Option<RoundSummary> {
        self.last_summary
    }

    fn finish(&mut self) -> RoundSummary {
        self.scheduler.stop();
        self.round.running = false;
        self.phase = GamePhase::GameOver;
        let summary = RoundSummary {
            score: self.score,
            duration_seconds: self.round.duration_seconds,
            misses: self.misses,
        };
        log::info!("Round over! Final score: {}", summary.score);
        self.last_summary = Some(summary);
        summary
    }
}
