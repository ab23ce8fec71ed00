//! Session module - mode state machine, practice timer and motion token
//!
//! The session owns everything about "how" the user is interacting with the
//! cube rather than the cube itself:
//!
//! - **Mode**: tutorial, practice or free (mutually exclusive)
//! - **Tutorial step**: index into the static catalog
//! - **Practice timer**: start timestamp plus the last computed elapsed time
//! - **Motion**: whether a quarter turn is currently being animated
//!
//! Time is always passed in by the caller (`now_ms`); the session never
//! reads a clock.

use crate::types::{Move, SessionMode, BASE_ROTATION_MS};

/// Reentrancy token for animated moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    #[default]
    Idle,
    /// A move was admitted and is waiting for its animation to settle.
    Busy(Move),
}

impl Motion {
    pub fn is_busy(&self) -> bool {
        matches!(self, Motion::Busy(_))
    }

    pub fn pending(&self) -> Option<Move> {
        match self {
            Motion::Idle => None,
            Motion::Busy(mv) => Some(*mv),
        }
    }
}

/// Result of asking the session to admit a new animated move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Started,
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    mode: SessionMode,
    current_step: usize,
    start_ms: Option<u64>,
    elapsed_ms: u64,
    motion: Motion,
}

impl Session {
    pub fn new() -> Self {
        Self {
            mode: SessionMode::Tutorial,
            current_step: 0,
            start_ms: None,
            elapsed_ms: 0,
            motion: Motion::Idle,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn start_ms(&self) -> Option<u64> {
        self.start_ms
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    pub fn is_busy(&self) -> bool {
        self.motion.is_busy()
    }

    /// Whether the practice clock is advancing. A solved cube freezes it.
    pub fn timer_running(&self, solved: bool) -> bool {
        self.mode == SessionMode::Practice && self.start_ms.is_some() && !solved
    }

    /// Switch modes.
    ///
    /// Entering practice (re)starts the timer at `now_ms`; leaving practice
    /// stops it. Any mode other than tutorial resets the step index.
    pub fn toggle_mode(&mut self, mode: SessionMode, now_ms: u64) {
        if mode == SessionMode::Practice {
            self.start_ms = Some(now_ms);
            self.elapsed_ms = 0;
        } else if self.mode == SessionMode::Practice {
            self.start_ms = None;
        }

        if mode != SessionMode::Tutorial {
            self.current_step = 0;
        }

        self.mode = mode;
    }

    /// Refresh the practice elapsed time.
    ///
    /// Returns true when the displayed value changed. No-op outside practice,
    /// once the timer has stopped, or when `solved` is set.
    pub fn tick(&mut self, now_ms: u64, solved: bool) -> bool {
        if self.mode != SessionMode::Practice || solved {
            return false;
        }
        let Some(start) = self.start_ms else {
            return false;
        };

        let elapsed = now_ms.saturating_sub(start);
        if elapsed == self.elapsed_ms {
            return false;
        }
        self.elapsed_ms = elapsed;
        true
    }

    /// Settle the practice clock at `now_ms` and report the time.
    ///
    /// The start reference is kept: the clock stays frozen only while the
    /// cube is solved, so leaving the solved state resumes it.
    pub fn solve_time(&mut self, now_ms: u64) -> Option<u64> {
        if self.mode != SessionMode::Practice {
            return None;
        }
        let start = self.start_ms?;
        self.elapsed_ms = now_ms.saturating_sub(start).max(self.elapsed_ms);
        Some(self.elapsed_ms)
    }

    /// Restart the practice clock without changing mode.
    pub fn restart_timer(&mut self, now_ms: u64) {
        if self.mode == SessionMode::Practice {
            self.start_ms = Some(now_ms);
            self.elapsed_ms = 0;
        }
    }

    pub fn set_step(&mut self, step: usize) {
        self.current_step = step;
    }

    pub fn begin_move(&mut self, mv: Move) -> Admission {
        if self.motion.is_busy() {
            return Admission::Busy;
        }
        self.motion = Motion::Busy(mv);
        Admission::Started
    }

    /// Release the motion token, returning the move that was pending.
    pub fn finish_move(&mut self) -> Option<Move> {
        let pending = self.motion.pending();
        self.motion = Motion::Idle;
        pending
    }

    pub(crate) fn restore(
        mode: SessionMode,
        current_step: usize,
        start_ms: Option<u64>,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            mode,
            current_step,
            start_ms: if mode == SessionMode::Practice {
                start_ms
            } else {
                None
            },
            elapsed_ms,
            motion: Motion::Idle,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// How long the renderer should animate a quarter turn.
///
/// `speed` is clamped to a small positive minimum so a zero or negative
/// setting can never stall the motion token.
pub fn settle_duration_ms(speed: f32) -> u32 {
    let speed = if speed.is_finite() { speed.max(0.01) } else { 1.0 };
    (BASE_ROTATION_MS as f32 / speed).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Face;

    #[test]
    fn test_initial_session() {
        let s = Session::new();
        assert_eq!(s.mode(), SessionMode::Tutorial);
        assert_eq!(s.current_step(), 0);
        assert_eq!(s.start_ms(), None);
        assert_eq!(s.elapsed_ms(), 0);
        assert!(!s.is_busy());
    }

    #[test]
    fn test_enter_practice_starts_timer() {
        let mut s = Session::new();
        s.set_step(3);
        s.toggle_mode(SessionMode::Practice, 1_000);

        assert_eq!(s.mode(), SessionMode::Practice);
        assert_eq!(s.start_ms(), Some(1_000));
        assert_eq!(s.elapsed_ms(), 0);
        assert_eq!(s.current_step(), 0);
    }

    #[test]
    fn test_leave_practice_clears_start() {
        let mut s = Session::new();
        s.toggle_mode(SessionMode::Practice, 1_000);
        assert!(s.timer_running(false));
        assert!(!s.timer_running(true));
        s.toggle_mode(SessionMode::Free, 2_000);
        assert_eq!(s.start_ms(), None);
        assert!(!s.timer_running(false));
    }

    #[test]
    fn test_entering_tutorial_keeps_step() {
        let mut s = Session::new();
        s.set_step(4);
        s.toggle_mode(SessionMode::Tutorial, 0);
        assert_eq!(s.current_step(), 4);
    }

    #[test]
    fn test_tick_only_in_practice() {
        let mut s = Session::new();
        assert!(!s.tick(500, false));
        assert_eq!(s.elapsed_ms(), 0);

        s.toggle_mode(SessionMode::Practice, 1_000);
        assert!(s.tick(1_250, false));
        assert_eq!(s.elapsed_ms(), 250);

        // Same value twice is not a change.
        assert!(!s.tick(1_250, false));
    }

    #[test]
    fn test_tick_frozen_while_solved() {
        let mut s = Session::new();
        s.toggle_mode(SessionMode::Practice, 0);
        s.tick(100, false);
        assert!(!s.tick(900, true));
        assert_eq!(s.elapsed_ms(), 100);
    }

    #[test]
    fn test_solve_time_keeps_start() {
        let mut s = Session::new();
        s.toggle_mode(SessionMode::Practice, 1_000);
        s.tick(2_000, false);
        assert_eq!(s.solve_time(4_500), Some(3_500));
        assert_eq!(s.start_ms(), Some(1_000));

        // Frozen while solved, running again once unsolved.
        assert!(!s.tick(6_000, true));
        assert_eq!(s.elapsed_ms(), 3_500);
        assert!(s.tick(9_000, false));
        assert_eq!(s.elapsed_ms(), 8_000);

        s.toggle_mode(SessionMode::Free, 9_500);
        assert_eq!(s.solve_time(9_600), None);
    }

    #[test]
    fn test_motion_token() {
        let mut s = Session::new();
        let mv = Move::cw(Face::Right);

        assert_eq!(s.begin_move(mv), Admission::Started);
        assert!(s.is_busy());
        assert_eq!(s.begin_move(Move::cw(Face::Top)), Admission::Busy);

        assert_eq!(s.finish_move(), Some(mv));
        assert!(!s.is_busy());
        assert_eq!(s.finish_move(), None);
    }

    #[test]
    fn test_settle_duration() {
        assert_eq!(settle_duration_ms(1.0), BASE_ROTATION_MS);
        assert_eq!(settle_duration_ms(2.0), BASE_ROTATION_MS / 2);
        assert_eq!(settle_duration_ms(0.5), BASE_ROTATION_MS * 2);
        assert!(settle_duration_ms(0.0) > 0);
        assert_eq!(settle_duration_ms(f32::NAN), BASE_ROTATION_MS);
    }
}
