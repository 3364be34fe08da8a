//! Challenge completion tracking

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Completed challenges needed to reach [`ProgressLevel::Intermediate`]
pub const INTERMEDIATE_THRESHOLD: usize = 20;

/// Completed challenges needed to reach [`ProgressLevel::Completed`]
pub const COMPLETED_THRESHOLD: usize = 35;

/// Set of completed challenge ids.
///
/// Serialized as `{ "<id>": true, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progress {
    completed: BTreeMap<u32, bool>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_completed(&mut self, challenge_id: u32) {
        self.completed.insert(challenge_id, true);
    }

    pub fn is_completed(&self, challenge_id: u32) -> bool {
        self.completed.get(&challenge_id).copied().unwrap_or(false)
    }

    pub fn completed_count(&self) -> usize {
        self.completed.values().filter(|done| **done).count()
    }

    pub fn reset(&mut self) {
        self.completed.clear();
    }

    pub fn summary(&self, total: usize) -> ProgressSummary {
        let completed = self.completed_count();
        let percent = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };

        ProgressSummary {
            completed,
            total,
            percent,
            level: ProgressLevel::for_completed(completed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressLevel {
    Beginner,
    Intermediate,
    Completed,
}

impl ProgressLevel {
    pub fn for_completed(completed: usize) -> Self {
        if completed >= COMPLETED_THRESHOLD {
            ProgressLevel::Completed
        } else if completed >= INTERMEDIATE_THRESHOLD {
            ProgressLevel::Intermediate
        } else {
            ProgressLevel::Beginner
        }
    }
}

impl fmt::Display for ProgressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressLevel::Beginner => write!(f, "Beginner"),
            ProgressLevel::Intermediate => write!(f, "Intermediate"),
            ProgressLevel::Completed => write!(f, "Completed!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
    pub level: ProgressLevel,
}
