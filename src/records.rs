//! Personal bests
//!
//! Tracks the furthest story stage reached and the longest infinite run.
//! Kept in memory; the host decides whether and where to store it.

use serde::{Deserialize, Serialize};

/// Best results across runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Records {
    /// Highest story stage reached (1-indexed)
    pub highest_stage: u32,
    /// Most knives stuck in a single infinite run
    pub highest_infinite: u32,
}

impl Default for Records {
    fn default() -> Self {
        Self {
            highest_stage: 1,
            highest_infinite: 0,
        }
    }
}

impl Records {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reached story stage (1-indexed). Returns true on a new best.
    pub fn record_stage(&mut self, stage: u32) -> bool {
        if stage > self.highest_stage {
            self.highest_stage = stage;
            log::info!("New best stage: {}", stage);
            true
        } else {
            false
        }
    }

    /// Record an infinite-mode knife count. Returns true on a new best.
    pub fn record_infinite(&mut self, count: u32) -> bool {
        if count > self.highest_infinite {
            self.highest_infinite = count;
            log::info!("New best infinite run: {} knives", count);
            true
        } else {
            false
        }
    }
}
