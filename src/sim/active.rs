//! The active set: which holes are tappable right now

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How show/hide steps combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveSetMode {
    /// One shared slot. A show replaces it, any hide empties it.
    #[default]
    Shared,
    /// Independent holes. A hide only removes its own hole, and only while
    /// the activation that scheduled it still owns that hole.
    Concurrent,
}

impl ActiveSetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveSetMode::Shared => "shared",
            ActiveSetMode::Concurrent => "concurrent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "shared" | "single" => Some(ActiveSetMode::Shared),
            "concurrent" | "multi" => Some(ActiveSetMode::Concurrent),
            _ => None,
        }
    }
}

/// A single show/hide instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepAction {
    Show(usize),
    Hide(usize),
}

/// Notification sent to the board renderer on every transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSetChange {
    /// Virtual time of the change (ms)
    pub at_ms: u64,
    /// Holes active after the change, ascending
    pub active: Vec<usize>,
}

/// Set of active hole indices
///
/// Each active hole remembers which spawn cycle raised it, so a stale hide
/// from an earlier cycle cannot knock down a newer mole in the same hole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveSet {
    mode: ActiveSetMode,
    /// hole -> owning cycle
    holes: BTreeMap<usize, u32>,
}

impl ActiveSet {
    pub fn new(mode: ActiveSetMode) -> Self {
        Self {
            mode,
            holes: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> ActiveSetMode {
        self.mode
    }

    /// Apply a step scheduled by cycle `owner`. Returns true if the set of
    /// active holes changed.
    pub fn apply(&mut self, action: StepAction, owner: u32) -> bool {
        match (self.mode, action) {
            (ActiveSetMode::Shared, StepAction::Show(hole)) => {
                let unchanged = self.holes.len() == 1 && self.holes.contains_key(&hole);
                self.holes.clear();
                self.holes.insert(hole, owner);
                !unchanged
            }
            (ActiveSetMode::Shared, StepAction::Hide(_)) => self.clear(),
            (ActiveSetMode::Concurrent, StepAction::Show(hole)) => {
                self.holes.insert(hole, owner).is_none()
            }
            (ActiveSetMode::Concurrent, StepAction::Hide(hole)) => {
                if self.holes.get(&hole) == Some(&owner) {
                    self.holes.remove(&hole);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Remove one hole regardless of mode or owner (a successful tap)
    pub fn remove(&mut self, hole: usize) -> bool {
        self.holes.remove(&hole).is_some()
    }

    /// Empty the set. Returns true if anything was active.
    pub fn clear(&mut self) -> bool {
        let changed = !self.holes.is_empty();
        self.holes.clear();
        changed
    }

    pub fn contains(&self, hole: usize) -> bool {
        self.holes.contains_key(&hole)
    }

    /// Cycle that raised `hole`, if it is active
    pub fn owner(&self, hole: usize) -> Option<u32> {
        self.holes.get(&hole).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.holes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.holes.len()
    }

    /// Active holes, ascending
    pub fn to_vec(&self) -> Vec<usize> {
        self.holes.keys().copied().collect()
    }
}
