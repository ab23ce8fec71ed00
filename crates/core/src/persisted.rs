//! Persisted engine record
//!
//! Flat JSON object. Each key falls back to the initial state when missing,
//! so records written by older builds keep loading. Unknown keys are ignored.

use serde::{Deserialize, Serialize};

use crate::faces::Faces;
use crate::history::HistoryEntry;
use crate::tutorial::LAST_STEP;
use crate::types::{Move, SessionMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub faces: Faces,
    pub moves: Vec<Move>,
    pub history: Vec<HistoryEntry>,
    /// Informational; always recomputed from `faces` on restore.
    pub is_solved: bool,
    pub mode: SessionMode,
    pub current_step: usize,
    pub elapsed_ms: u64,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            faces: Faces::solved(),
            moves: Vec::new(),
            history: Vec::new(),
            is_solved: true,
            mode: SessionMode::Tutorial,
            current_step: 0,
            elapsed_ms: 0,
        }
    }
}

impl PersistedState {
    /// Parse a stored record. Malformed input yields the default record.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str::<PersistedState>(raw) {
            Ok(state) => state.normalized(),
            Err(err) => {
                tracing::warn!(%err, "discarding unreadable engine record");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Repair a record so it satisfies the engine invariants.
    ///
    /// Entry `i` of the history must hold the first `i` moves of the log.
    /// Any other history cannot be undone safely; it is dropped together
    /// with the move log and the faces are kept.
    pub fn normalized(mut self) -> Self {
        if !self.history_matches_moves() {
            tracing::warn!(
                history = self.history.len(),
                moves = self.moves.len(),
                "history does not match move log; dropping both"
            );
            self.history.clear();
            self.moves.clear();
        }
        self.current_step = self.current_step.min(LAST_STEP);
        self.is_solved = crate::faces::is_solved(&self.faces);
        self
    }

    fn history_matches_moves(&self) -> bool {
        self.history.len() == self.moves.len()
            && self
                .history
                .iter()
                .enumerate()
                .all(|(i, entry)| entry.moves == self.moves[..i])
    }
}
