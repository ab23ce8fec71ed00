//! Engine module - the single owner of cube, history and session state
//!
//! Every mutation goes through [`CubeEngine`]. Applying a move is one unit:
//! snapshot the prior state, rotate, append the move, recompute the solved
//! flag, advance the practice/tutorial bookkeeping. Readers take an
//! [`EngineSnapshot`] and never touch the engine directly.

use crate::cube::CubeState;
use crate::faces::{rotate_face, Faces};
use crate::history::{record_snapshot, History};
use crate::persisted::PersistedState;
use crate::scramble::scramble_moves;
use crate::session::{Admission, Session};
use crate::snapshot::EngineSnapshot;
use crate::tutorial::{self, TutorialStep, Validation, LAST_STEP};
use crate::types::{CubeError, Direction, Face, Move, SessionMode};

/// What happened to a committed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub mv: Move,
    pub is_solved: bool,
    pub move_count: usize,
    /// Tutorial step completed by this move, if any.
    pub step_completed: Option<usize>,
    /// Practice time when this move solved the cube in practice mode,
    /// measured at the commit timestamp.
    pub practice_solved_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied(Applied),
    /// Rejected because an animated move is still settling.
    Dropped,
}

impl MoveOutcome {
    pub fn applied(&self) -> Option<&Applied> {
        match self {
            MoveOutcome::Applied(a) => Some(a),
            MoveOutcome::Dropped => None,
        }
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, MoveOutcome::Dropped)
    }
}

#[derive(Debug, Clone)]
pub struct CubeEngine {
    cube: CubeState,
    history: History,
    session: Session,
    /// Last timestamp seen through `tick`/`toggle_mode`.
    clock_ms: u64,
}

impl CubeEngine {
    /// A solved cube in tutorial mode at step 0.
    pub fn new() -> Self {
        Self {
            cube: CubeState::new(),
            history: History::new(),
            session: Session::new(),
            clock_ms: 0,
        }
    }

    pub fn cube(&self) -> &CubeState {
        &self.cube
    }

    pub fn faces(&self) -> &Faces {
        self.cube.faces()
    }

    pub fn moves(&self) -> &[Move] {
        self.cube.moves()
    }

    pub fn move_count(&self) -> usize {
        self.cube.move_count()
    }

    pub fn is_solved(&self) -> bool {
        self.cube.is_solved()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn mode(&self) -> SessionMode {
        self.session.mode()
    }

    pub fn current_step(&self) -> usize {
        self.session.current_step()
    }

    pub fn tutorial_step(&self) -> Option<&'static TutorialStep> {
        tutorial::step(self.session.current_step())
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.session.elapsed_ms()
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Verdict of the current step against the move log.
    pub fn validation(&self) -> Validation {
        tutorial::validate(
            self.cube.moves(),
            tutorial::required_moves(self.session.current_step()),
        )
    }

    /// Apply a move immediately. Dropped while an animated move is pending.
    ///
    /// Timed against the last clock value seen by `tick`/`toggle_mode`; use
    /// [`apply_move_at`](Self::apply_move_at) to stamp the move explicitly.
    pub fn apply_move(&mut self, mv: Move) -> MoveOutcome {
        self.apply_move_at(mv, self.clock_ms)
    }

    pub fn apply_move_at(&mut self, mv: Move, now_ms: u64) -> MoveOutcome {
        if self.session.is_busy() {
            tracing::debug!(notation = mv.notation(), "move dropped while busy");
            return MoveOutcome::Dropped;
        }
        MoveOutcome::Applied(self.commit(mv, now_ms))
    }

    pub fn rotate_face(&mut self, face: Face, direction: Direction) -> MoveOutcome {
        self.apply_move(Move::new(face, direction))
    }

    /// Parse `notation` (e.g. `"R'"`) and apply it.
    pub fn apply_notation(&mut self, notation: &str) -> Result<MoveOutcome, CubeError> {
        let mv = Move::parse(notation)?;
        Ok(self.apply_move(mv))
    }

    /// Admit a move for animation. The cube does not change until
    /// [`finish_move`](Self::finish_move).
    pub fn begin_move(&mut self, mv: Move) -> Admission {
        let admission = self.session.begin_move(mv);
        if admission == Admission::Busy {
            tracing::debug!(notation = mv.notation(), "move dropped while busy");
        }
        admission
    }

    /// Commit the pending animated move and return to idle.
    pub fn finish_move(&mut self) -> Option<MoveOutcome> {
        self.finish_move_at(self.clock_ms)
    }

    pub fn finish_move_at(&mut self, now_ms: u64) -> Option<MoveOutcome> {
        let mv = self.session.finish_move()?;
        Some(MoveOutcome::Applied(self.commit(mv, now_ms)))
    }

    fn commit(&mut self, mv: Move, now_ms: u64) -> Applied {
        self.clock_ms = self.clock_ms.max(now_ms);
        let step = self.session.current_step();
        let tutorial_active = self.session.mode() == SessionMode::Tutorial;
        let was_valid = self.validation().is_valid;
        let was_solved = self.cube.is_solved();

        self.history.push(record_snapshot(&self.cube));
        self.cube = self.cube.applied(mv);

        let mut step_completed = None;
        if tutorial_active && !tutorial::required_moves(step).is_empty() {
            let now_valid = self.validation().is_valid;
            if now_valid && !was_valid {
                step_completed = Some(step);
                self.session.set_step((step + 1).min(LAST_STEP));
            }
        }

        let mut practice_solved_ms = None;
        if self.cube.is_solved() && !was_solved {
            practice_solved_ms = self.session.solve_time(self.clock_ms);
        }

        Applied {
            mv,
            is_solved: self.cube.is_solved(),
            move_count: self.cube.move_count(),
            step_completed,
            practice_solved_ms,
        }
    }

    /// Undo the last move. Returns false when there is nothing to undo or
    /// a move is still animating.
    ///
    /// Undoing out of a solved practice cube resumes its clock on the next
    /// tick.
    pub fn undo(&mut self) -> bool {
        if self.session.is_busy() {
            return false;
        }
        match self.history.undo() {
            Some(restored) => {
                self.cube = restored;
                true
            }
            None => false,
        }
    }

    /// Back to a solved cube with an empty log. Mode and step are kept.
    pub fn reset(&mut self) {
        self.session.finish_move();
        self.cube = CubeState::new();
        self.history.clear();
        self.session.restart_timer(self.clock_ms);
    }

    /// Replace the cube with a scrambled one.
    ///
    /// The scramble becomes the new baseline: the move log and history are
    /// cleared, so undo cannot walk back into the scramble.
    pub fn scramble(&mut self, seed: u32, len: usize) -> Vec<Move> {
        self.session.finish_move();
        let moves = scramble_moves(seed, len);
        let faces = moves.iter().fold(Faces::solved(), |faces, mv| {
            rotate_face(&faces, mv.face, mv.direction)
        });
        self.cube = CubeState::from_parts(faces, Vec::new());
        self.history.clear();
        self.session.restart_timer(self.clock_ms);
        tracing::debug!(seed, len, "scrambled");
        moves
    }

    pub fn toggle_mode(&mut self, mode: SessionMode, now_ms: u64) {
        self.clock_ms = now_ms;
        self.session.toggle_mode(mode, now_ms);
    }

    /// Advance the practice timer. Returns true when the elapsed time changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.clock_ms = now_ms;
        self.session.tick(now_ms, self.cube.is_solved())
    }

    pub fn next_step(&mut self) -> usize {
        self.set_step(self.session.current_step().saturating_add(1))
    }

    pub fn prev_step(&mut self) -> usize {
        self.set_step(self.session.current_step().saturating_sub(1))
    }

    /// Jump to a tutorial step (clamped). Ignored outside tutorial mode.
    pub fn set_step(&mut self, step: usize) -> usize {
        if self.session.mode() == SessionMode::Tutorial {
            self.session.set_step(step.min(LAST_STEP));
        }
        self.session.current_step()
    }

    pub fn snapshot_into(&self, out: &mut EngineSnapshot) {
        out.faces = *self.cube.faces();
        out.moves.clear();
        out.moves.extend_from_slice(self.cube.moves());
        out.history_len = self.history.len();
        out.is_solved = self.cube.is_solved();
        out.mode = self.session.mode();
        out.current_step = self.session.current_step();
        out.elapsed_ms = self.session.elapsed_ms();
        out.timer_running = self.session.timer_running(self.cube.is_solved());
        out.pending = self.session.motion().pending();
        out.validation = self.validation();
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let mut s = EngineSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            faces: *self.cube.faces(),
            moves: self.cube.moves().to_vec(),
            history: self.history.entries().to_vec(),
            is_solved: self.cube.is_solved(),
            mode: self.session.mode(),
            current_step: self.session.current_step(),
            elapsed_ms: self.session.elapsed_ms(),
        }
    }

    /// Rebuild an engine from a stored record.
    ///
    /// A practice session resumes its clock from `now_ms` minus the stored
    /// elapsed time. A solved cube keeps it frozen until it is unsolved.
    pub fn from_persisted(state: PersistedState, now_ms: u64) -> Self {
        let state = state.normalized();
        let cube = CubeState::from_parts(state.faces, state.moves);
        let start_ms = Some(now_ms.saturating_sub(state.elapsed_ms));
        let step = if state.mode == SessionMode::Tutorial {
            state.current_step
        } else {
            0
        };
        Self {
            history: History::from_entries(state.history),
            session: Session::restore(state.mode, step, start_ms, state.elapsed_ms),
            cube,
            clock_ms: now_ms,
        }
    }
}

impl Default for CubeEngine {
    fn default() -> Self {
        Self::new()
    }
}
