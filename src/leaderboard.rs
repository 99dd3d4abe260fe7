//! Cloud leaderboard client
//!
//! Scores go to a remote document store behind the [`ScoreStore`] trait.
//! The client validates input before touching the store and retries
//! transient failures with a fixed delay. Nothing here runs on the round's
//! clock, so a slow or failing store never affects spawn timing.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MAX_CLOUD_SCORE, MAX_NAME_LEN};
use crate::highscores::LocalLeaderboard;

/// Largest page the client will ask the store for
pub const MAX_QUERY_LIMIT: usize = 100;
/// Over-fetch factor when filtering to today's scores
const TODAY_OVERFETCH: usize = 3;

/// Errors reported by a score store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("service unavailable")]
    Unavailable,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("permission denied")]
    PermissionDenied,
    #[error("quota exceeded")]
    QuotaExceeded,
    #[error("store error: {0}")]
    Other(String),
}

impl StoreError {
    /// Worth retrying?
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable | StoreError::DeadlineExceeded)
    }
}

/// Errors from the leaderboard client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaderboardError {
    #[error("player name must not be empty")]
    InvalidName,
    #[error("score {0} is outside 0..={max}", max = MAX_CLOUD_SCORE)]
    InvalidScore(u32),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A leaderboard row as stored remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudScore {
    /// Document id, assigned by the store
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub score: u32,
    /// Day the score was set (UTC)
    pub date: NaiveDate,
    /// Unix timestamp (ms) when saved
    pub timestamp: f64,
}

/// Remote document store holding leaderboard rows
pub trait ScoreStore {
    /// Insert a row, returning its document id
    fn insert(&mut self, score: CloudScore) -> Result<String, StoreError>;
    /// Highest scores first, at most `limit` rows
    fn top_by_score(&self, limit: usize) -> Result<Vec<CloudScore>, StoreError>;
    /// Cheap read to check connectivity
    fn probe(&self) -> Result<(), StoreError>;
}

/// Fixed-delay retry for transient store failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Run `op`, retrying transient errors. `pause` is called between attempts.
    pub fn run<T, F, P>(&self, mut op: F, mut pause: P) -> Result<T, StoreError>
    where
        F: FnMut() -> Result<T, StoreError>,
        P: FnMut(Duration),
    {
        let mut retries_left = self.max_retries;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && retries_left > 0 => {
                    log::warn!("Retrying operation ({}), {} attempts left...", e, retries_left);
                    retries_left -= 1;
                    pause(self.delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Trim and cap a player name. Empty names are rejected.
pub fn normalize_name(name: &str) -> Result<String, LeaderboardError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LeaderboardError::InvalidName);
    }
    Ok(trimmed.chars().take(MAX_NAME_LEN).collect())
}

#[cfg(not(target_arch = "wasm32"))]
fn default_pause(delay: Duration) {
    std::thread::sleep(delay);
}

// The browser has no blocking sleep; retry immediately
#[cfg(target_arch = "wasm32")]
fn default_pause(_delay: Duration) {}

/// Leaderboard client over a [`ScoreStore`]
#[derive(Debug)]
pub struct CloudLeaderboard<S> {
    store: S,
    retry: RetryPolicy,
    pause: fn(Duration),
}

impl<S: ScoreStore> CloudLeaderboard<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
            pause: default_pause,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the wait between retries
    pub fn with_pause(mut self, pause: fn(Duration)) -> Self {
        self.pause = pause;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Validate and save a score. Returns the new document id.
    pub fn save(
        &mut self,
        name: &str,
        score: u32,
        today: NaiveDate,
        timestamp: f64,
    ) -> Result<String, LeaderboardError> {
        let name = normalize_name(name).inspect_err(|_| log::warn!("Invalid player name"))?;
        if score > MAX_CLOUD_SCORE {
            log::warn!("Invalid score value: {}", score);
            return Err(LeaderboardError::InvalidScore(score));
        }

        let row = CloudScore {
            id: None,
            name,
            score,
            date: today,
            timestamp,
        };
        let store = &mut self.store;
        let id = self
            .retry
            .run(|| store.insert(row.clone()), self.pause)
            .inspect_err(|e| log_store_error("saving score to cloud", e))?;
        log::info!("Score saved with ID: {}", id);
        Ok(id)
    }

    /// All-time top scores (limit capped at 100)
    pub fn top_scores(&self, limit: usize) -> Result<Vec<CloudScore>, LeaderboardError> {
        let limit = limit.min(MAX_QUERY_LIMIT);
        let rows = self
            .retry
            .run(|| self.store.top_by_score(limit), self.pause)
            .inspect_err(|e| log_store_error("getting top scores", e))?;
        Ok(rows.into_iter().filter(is_well_formed).collect())
    }

    /// Top scores set on `today`.
    ///
    /// The store is only ordered by score, so this over-fetches and filters;
    /// a busy day can come back short.
    pub fn today_top_scores(
        &self,
        limit: usize,
        today: NaiveDate,
    ) -> Result<Vec<CloudScore>, LeaderboardError> {
        let limit = limit.min(MAX_QUERY_LIMIT);
        let rows = self
            .retry
            .run(|| self.store.top_by_score(limit * TODAY_OVERFETCH), self.pause)
            .inspect_err(|e| log_store_error("getting today's top scores", e))?;
        Ok(rows
            .into_iter()
            .filter(|row| is_well_formed(row) && row.date == today)
            .take(limit)
            .collect())
    }

    /// Health check
    pub fn check_connection(&self) -> bool {
        match self.store.probe() {
            Ok(()) => true,
            Err(e) => {
                log::error!("Leaderboard connection check failed: {}", e);
                false
            }
        }
    }
}

fn is_well_formed(row: &CloudScore) -> bool {
    !row.name.trim().is_empty()
}

fn log_store_error(context: &str, e: &StoreError) {
    log::error!("Error {}: {}", context, e);
    match e {
        StoreError::PermissionDenied => log::error!("Permission denied - check store rules"),
        StoreError::Unavailable => log::error!("Leaderboard service unavailable"),
        StoreError::QuotaExceeded => log::error!("Leaderboard quota exceeded"),
        _ => {}
    }
}

/// What happened when a finished round was submitted
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitReport {
    /// Rank in the local table, if it made the cut
    pub local_rank: Option<usize>,
    /// Cloud document id, if the cloud save worked
    pub cloud_id: Option<String>,
}

/// Add a round to the local table under the normalized player name, saving
/// the table if it made the cut. Returns the new rank.
pub fn record_local_score(
    player_name: &str,
    score: u32,
    today: NaiveDate,
    local: &mut LocalLeaderboard,
) -> Option<usize> {
    if score == 0 {
        return None;
    }
    let name = normalize_name(player_name).ok()?;
    let rank = local.add_score(&name, score, today)?;
    local.save();
    Some(rank)
}

/// Record a finished round locally and in the cloud.
///
/// Rounds with no score or no player name are not recorded. A cloud failure
/// is logged and leaves the local entry in place.
pub fn submit_round_score<S: ScoreStore>(
    player_name: Option<&str>,
    score: u32,
    today: NaiveDate,
    timestamp: f64,
    local: &mut LocalLeaderboard,
    cloud: &mut CloudLeaderboard<S>,
) -> SubmitReport {
    let Some(name) = player_name.filter(|_| score > 0) else {
        log::info!("Score not saved - Score: {}, PlayerName: {:?}", score, player_name);
        return SubmitReport::default();
    };

    let local_rank = record_local_score(name, score, today, local);

    let cloud_id = match cloud.save(name, score, today, timestamp) {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("Score NOT saved to cloud: {}", e);
            None
        }
    };

    SubmitReport {
        local_rank,
        cloud_id,
    }
}

/// In-memory [`ScoreStore`] with scriptable failures
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    rows: Vec<CloudScore>,
    next_id: u64,
    /// Errors returned by the next calls, in order
    failures: VecDeque<StoreError>,
    /// Calls made, including failed ones
    calls: u32,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&mut self, error: StoreError) {
        self.failures.push_back(error);
    }

    pub fn rows(&self) -> &[CloudScore] {
        &self.rows
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }

    fn take_failure(&mut self) -> Result<(), StoreError> {
        self.calls += 1;
        match self.failures.pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn insert(&mut self, mut score: CloudScore) -> Result<String, StoreError> {
        self.take_failure()?;
        self.next_id += 1;
        let id = format!("score-{}", self.next_id);
        score.id = Some(id.clone());
        self.rows.push(score);
        Ok(id)
    }

    fn top_by_score(&self, limit: usize) -> Result<Vec<CloudScore>, StoreError> {
        let mut rows = self.rows.clone();
        // Stable: equal scores keep insertion order
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows.truncate(limit);
        Ok(rows)
    }

    fn probe(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
