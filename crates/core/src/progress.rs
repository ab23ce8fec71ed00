//! Progress module - long-lived tutorial progress and practice records
//!
//! Kept apart from the engine: the engine reports outcomes, the app shell
//! folds them into this record and writes it to disk.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::BEST_TIMES_KEPT;

pub const ACH_FIRST_MOVE: &str = "first-move";
pub const ACH_FIRST_SOLVE: &str = "first-solve";
pub const ACH_TUTORIAL_COMPLETE: &str = "tutorial-complete";

/// Progress record.
///
/// Every field defaults independently, so an older file missing a key still
/// loads (shallow merge over defaults).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub completed_steps: BTreeSet<usize>,
    /// Highest step reached plus one.
    pub current_step: usize,
    pub total_moves: u64,
    /// Best practice times in milliseconds, ascending.
    pub best_times: Vec<u64>,
    pub achievements: BTreeSet<String>,
    /// Unix time (ms) of the last recorded practice solve.
    pub last_practice_ms: Option<u64>,
    pub tutorial_completed: bool,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `step` completed. Returns true the first time only.
    pub fn complete_step(&mut self, step: usize) -> bool {
        self.current_step = self.current_step.max(step + 1);
        self.completed_steps.insert(step)
    }

    /// Record a practice solve time, keeping only the best few.
    pub fn record_time(&mut self, time_ms: u64, at_unix_ms: u64) {
        self.best_times.push(time_ms);
        self.best_times.sort_unstable();
        self.best_times.truncate(BEST_TIMES_KEPT);
        self.last_practice_ms = Some(at_unix_ms);
    }

    pub fn best_time(&self) -> Option<u64> {
        self.best_times.first().copied()
    }

    /// Returns true when the achievement was newly unlocked.
    pub fn unlock_achievement(&mut self, name: &str) -> bool {
        if self.achievements.contains(name) {
            return false;
        }
        self.achievements.insert(name.to_string())
    }

    pub fn has_achievement(&self, name: &str) -> bool {
        self.achievements.contains(name)
    }

    pub fn record_move(&mut self) {
        self.total_moves = self.total_moves.saturating_add(1);
    }

    /// Returns true when this call flipped the tutorial to completed.
    pub fn mark_tutorial_completed(&mut self) -> bool {
        let newly = !self.tutorial_completed;
        self.tutorial_completed = true;
        newly
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Parse a stored record, falling back to defaults on malformed input.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(%err, "discarding unreadable progress record");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Format milliseconds as `MM:SS.CC`.
pub fn format_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1_000) % 60;
    let centis = (ms % 1_000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_step_idempotent() {
        let mut p = Progress::new();
        assert!(p.complete_step(2));
        assert!(!p.complete_step(2));
        assert_eq!(p.completed_steps.len(), 1);
        assert_eq!(p.current_step, 3);

        // Completing an earlier step never lowers the high-water mark.
        p.complete_step(1);
        assert_eq!(p.current_step, 3);
    }

    #[test]
    fn test_record_time_keeps_best_five() {
        let mut p = Progress::new();
        for (i, t) in [9_000, 3_000, 7_000, 1_000, 5_000, 8_000, 2_000]
            .into_iter()
            .enumerate()
        {
            p.record_time(t, i as u64);
        }
        assert_eq!(p.best_times, vec![1_000, 2_000, 3_000, 5_000, 7_000]);
        assert_eq!(p.best_time(), Some(1_000));
        assert_eq!(p.last_practice_ms, Some(6));
    }

    #[test]
    fn test_achievements_are_a_set() {
        let mut p = Progress::new();
        assert!(p.unlock_achievement(ACH_FIRST_MOVE));
        assert!(!p.unlock_achievement(ACH_FIRST_MOVE));
        assert!(p.has_achievement(ACH_FIRST_MOVE));
        assert_eq!(p.achievements.len(), 1);
    }

    #[test]
    fn test_reset() {
        let mut p = Progress::new();
        p.record_move();
        p.complete_step(1);
        p.mark_tutorial_completed();
        p.reset();
        assert_eq!(p, Progress::default());
    }

    #[test]
    fn test_partial_record_merges_over_defaults() {
        let p = Progress::from_json(r#"{"total_moves": 12}"#);
        assert_eq!(p.total_moves, 12);
        assert!(p.best_times.is_empty());
        assert!(!p.tutorial_completed);
    }

    #[test]
    fn test_malformed_record_is_default() {
        assert_eq!(Progress::from_json("{not json"), Progress::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut p = Progress::new();
        p.complete_step(4);
        p.unlock_achievement(ACH_FIRST_SOLVE);
        p.record_time(12_340, 99);
        let raw = p.to_json().unwrap();
        assert_eq!(Progress::from_json(&raw), p);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00.00");
        assert_eq!(format_time(1_234), "00:01.23");
        assert_eq!(format_time(61_005), "01:01.00");
        assert_eq!(format_time(3_599_990), "59:59.99");
    }
}
