use crate::faces::Faces;
use crate::tutorial::Validation;
use crate::types::{Move, SessionMode};

/// Read-only view of the engine handed to renderers and observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub faces: Faces,
    pub moves: Vec<Move>,
    pub history_len: usize,
    pub is_solved: bool,
    pub mode: SessionMode,
    pub current_step: usize,
    pub elapsed_ms: u64,
    pub timer_running: bool,
    /// Move currently being animated, if any.
    pub pending: Option<Move>,
    pub validation: Validation,
}

impl EngineSnapshot {
    pub fn clear(&mut self) {
        self.faces = Faces::solved();
        self.moves.clear();
        self.history_len = 0;
        self.is_solved = true;
        self.mode = SessionMode::Tutorial;
        self.current_step = 0;
        self.elapsed_ms = 0;
        self.timer_running = false;
        self.pending = None;
        self.validation = Validation {
            is_valid: true,
            message: crate::tutorial::MSG_CORRECT,
        };
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.moves.last().copied()
    }

    pub fn busy(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for EngineSnapshot {
    fn default() -> Self {
        let mut s = Self {
            faces: Faces::solved(),
            moves: Vec::new(),
            history_len: 0,
            is_solved: true,
            mode: SessionMode::Tutorial,
            current_step: 0,
            elapsed_ms: 0,
            timer_running: false,
            pending: None,
            validation: Validation {
                is_valid: true,
                message: crate::tutorial::MSG_CORRECT,
            },
        };
        s.clear();
        s
    }
}
