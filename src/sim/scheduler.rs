//! Mole spawn scheduler
//!
//! Decides which holes light up, when, and for how long over one round.
//! The scheduler owns the active set and a single [`TimerQueue`]; every
//! delayed action (pattern steps and the next cycle) lives in that queue, so
//! [`SpawnScheduler::stop`] can cancel all of it in one go.
//!
//! The round clock is external: the driver reports the remaining seconds via
//! [`SpawnScheduler::tick`] and moves virtual time with
//! [`SpawnScheduler::advance_to`].

use std::fmt;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::active::{ActiveSet, ActiveSetChange, ActiveSetMode, StepAction};
use super::clock::TimerQueue;
use super::difficulty::{CycleTiming, PatternWeights, progress_ratio};
use super::pattern::{SpawnPattern, SpawnStep};
use crate::consts::NUM_HOLES;

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerPhase {
    /// No round running, nothing pending
    Idle,
    /// Inside a spawn cycle (choosing and planning)
    SchedulingCycle,
    /// Waiting on timers between cycles
    BetweenSpawns,
}

/// Board shape and active-set semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of holes on the board
    pub holes: usize,
    pub mode: ActiveSetMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            holes: NUM_HOLES,
            mode: ActiveSetMode::Shared,
        }
    }
}

/// One cycle's decision (for logging, debugging and tests)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Cycle number within the round, from 0
    pub cycle: u32,
    /// Virtual time the cycle started (ms)
    pub started_at_ms: u64,
    /// Remaining seconds the cycle was computed from
    pub remaining_seconds: u32,
    pub progress: f64,
    pub timing: CycleTiming,
    pub pattern: SpawnPattern,
    /// Planned steps, offsets relative to `started_at_ms`
    pub steps: Vec<SpawnStep>,
}

/// Receives every active-set transition
pub type ActiveSetListener = Box<dyn FnMut(&ActiveSetChange)>;

/// Work items in the timer queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    NextCycle,
    /// A pattern step and the cycle that planned it
    Step(StepAction, u32),
}

pub struct SpawnScheduler {
    config: SchedulerConfig,
    rng: Pcg32,
    timers: TimerQueue<Task>,
    active: ActiveSet,
    phase: SchedulerPhase,
    running: bool,
    total_seconds: u32,
    remaining_seconds: u32,
    cycles: u32,
    last_event: Option<SpawnEvent>,
    listeners: Vec<ActiveSetListener>,
}

impl fmt::Debug for SpawnScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnScheduler")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("running", &self.running)
            .field("now_ms", &self.timers.now_ms())
            .field("pending_timers", &self.timers.pending())
            .field("remaining_seconds", &self.remaining_seconds)
            .field("active", &self.active.to_vec())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl SpawnScheduler {
    /// Create an idle scheduler with a seeded RNG
    pub fn new(config: SchedulerConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            timers: TimerQueue::new(),
            active: ActiveSet::new(config.mode),
            phase: SchedulerPhase::Idle,
            running: false,
            total_seconds: 0,
            remaining_seconds: 0,
            cycles: 0,
            last_event: None,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Register a consumer for active-set transitions
    pub fn on_active_set_changed<F>(&mut self, listener: F)
    where
        F: FnMut(&ActiveSetChange) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Begin scheduling a round of `duration_seconds`.
    ///
    /// Returns false (and changes nothing) if a round is already running.
    /// The first cycle runs immediately at progress 0.
    pub fn start(&mut self, duration_seconds: u32) -> bool {
        if self.running {
            log::debug!("Spawn scheduler already running, ignoring start");
            return false;
        }

        self.reset_schedule();
        self.running = true;
        self.total_seconds = duration_seconds;
        self.remaining_seconds = duration_seconds;
        self.cycles = 0;
        self.last_event = None;
        self.phase = SchedulerPhase::BetweenSpawns;
        log::info!("Spawn scheduler started ({}s round)", duration_seconds);

        self.run_cycle();
        true
    }

    /// Halt the round: cancel every pending timer and empty the active set
    pub fn stop(&mut self) {
        let cancelled = self.reset_schedule();
        let was_running = self.running;
        self.running = false;
        self.phase = SchedulerPhase::Idle;
        if was_running {
            log::info!(
                "Spawn scheduler stopped after {} cycles ({} timers cancelled)",
                self.cycles,
                cancelled
            );
        }
    }

    /// Report the round's remaining seconds (authoritative for the next cycle)
    pub fn tick(&mut self, remaining_seconds: u32) {
        if !self.running {
            return;
        }
        self.remaining_seconds = remaining_seconds.min(self.total_seconds);
    }

    /// Fire every timer due at or before `now_ms`, in order
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some((_, task)) = self.timers.pop_due(now_ms) {
            self.dispatch(task);
        }
        self.timers.advance_to(now_ms);
    }

    pub fn advance_by(&mut self, delta_ms: u64) {
        self.advance_to(self.timers.now_ms().saturating_add(delta_ms));
    }

    /// A tap on `hole`. If it is active it is knocked down and this returns true.
    pub fn whack(&mut self, hole: usize) -> bool {
        if !self.running || !self.active.remove(hole) {
            return false;
        }
        self.notify();
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Current progress ratio
    pub fn progress(&self) -> f64 {
        progress_ratio(self.total_seconds, self.remaining_seconds)
    }

    /// Active holes, ascending
    pub fn active_holes(&self) -> Vec<usize> {
        self.active.to_vec()
    }

    pub fn is_active(&self, hole: usize) -> bool {
        self.active.contains(hole)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Cycles run since the last start
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn last_event(&self) -> Option<&SpawnEvent> {
        self.last_event.as_ref()
    }

    /// Cancel all timers and empty the active set. Returns timers cancelled.
    fn reset_schedule(&mut self) -> usize {
        let cancelled = self.timers.cancel_all();
        if self.active.clear() {
            self.notify();
        }
        cancelled
    }

    fn dispatch(&mut self, task: Task) {
        // stop() empties the queue, so nothing should fire while idle
        debug_assert!(self.running, "timer fired after stop: {task:?}");
        match task {
            Task::NextCycle => {
                // Re-check the latest reported time, not the value the
                // previous cycle started with
                if self.running && self.remaining_seconds > 0 {
                    self.run_cycle();
                } else {
                    log::debug!("Round time exhausted, no further spawn cycles");
                }
            }
            Task::Step(action, cycle) => {
                if self.active.apply(action, cycle) {
                    self.notify();
                }
            }
        }
    }

    fn run_cycle(&mut self) {
        if self.remaining_seconds == 0 {
            return;
        }
        self.phase = SchedulerPhase::SchedulingCycle;

        let progress = self.progress();
        let timing = CycleTiming::roll(progress, &mut self.rng);
        let pattern = PatternWeights::for_progress(progress).choose(&mut self.rng);
        let steps = pattern.plan(
            &mut self.rng,
            self.config.holes,
            timing.visible(),
            self.config.mode,
        );

        log::debug!(
            "Time: {}s, Pattern: {}, Spawn delay: {}ms, Visible: {}ms",
            self.remaining_seconds,
            pattern.name(),
            timing.spawn_delay(),
            timing.visible()
        );

        for step in &steps {
            self.timers.schedule(step.at_ms, Task::Step(step.action, self.cycles));
        }
        self.timers.schedule(timing.spawn_delay(), Task::NextCycle);

        self.last_event = Some(SpawnEvent {
            cycle: self.cycles,
            started_at_ms: self.timers.now_ms(),
            remaining_seconds: self.remaining_seconds,
            progress,
            timing,
            pattern,
            steps,
        });
        self.cycles += 1;
        self.phase = SchedulerPhase::BetweenSpawns;

        // Steps at offset 0 take effect now rather than on the next advance
        let now = self.timers.now_ms();
        self.advance_to(now);
    }

    fn notify(&mut self) {
        let change = ActiveSetChange {
            at_ms: self.timers.now_ms(),
            active: self.active.to_vec(),
        };
        for listener in &mut self.listeners {
            listener(&change);
        }
    }
}
