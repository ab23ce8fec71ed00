//! History stack - snapshots taken before every move, popped by undo
//!
//! Invariant (maintained by the engine): `history.len() == moves.len()`.
//! Each applied move pushes exactly one entry holding the state just before
//! it; undo pops exactly one. There is no redo.

use serde::{Deserialize, Serialize};

use crate::cube::CubeState;
use crate::faces::Faces;
use crate::types::Move;

/// Faces and move log captured before a move was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub faces: Faces,
    pub moves: Vec<Move>,
}

/// Capture `state` ahead of a mutation.
pub fn record_snapshot(state: &CubeState) -> HistoryEntry {
    HistoryEntry {
        faces: *state.faces(),
        moves: state.moves().to_vec(),
    }
}

/// Undo stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Pop the newest snapshot and return the state it describes.
    ///
    /// Returns `None` when there is nothing to undo; callers treat that as a
    /// no-op. The solved flag is recomputed from the restored faces.
    pub fn undo(&mut self) -> Option<CubeState> {
        let entry = self.entries.pop()?;
        Some(CubeState::from_parts(entry.faces, entry.moves))
    }
}
