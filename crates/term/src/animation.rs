//! Quarter-turn animation timing.
//!
//! The renderer owns the animation; the engine only knows a move is busy.
//! When [`RotationAnimation::is_done`] flips, the event loop calls
//! `CubeEngine::finish_move`.

use crate::core::settle_duration_ms;
use crate::types::{clamp_animation_speed, Move};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationAnimation {
    mv: Move,
    start_ms: u64,
    duration_ms: u32,
}

impl RotationAnimation {
    pub fn start(mv: Move, speed: f32, now_ms: u64) -> Self {
        Self {
            mv,
            start_ms: now_ms,
            duration_ms: settle_duration_ms(clamp_animation_speed(speed)),
        }
    }

    pub fn mv(&self) -> Move {
        self.mv
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Fraction of the turn completed, in `[0, 1]`.
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let t = now_ms.saturating_sub(self.start_ms) as f32 / self.duration_ms as f32;
        t.clamp(0.0, 1.0)
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms as u64
    }

    /// Time left until the turn settles.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        (self.start_ms + self.duration_ms as u64).saturating_sub(now_ms)
    }

    /// Turned angle in degrees, signed by direction (clockwise positive).
    pub fn angle_deg(&self, now_ms: u64) -> f32 {
        let sign = match self.mv.direction {
            crate::types::Direction::Clockwise => 1.0,
            crate::types::Direction::CounterClockwise => -1.0,
        };
        sign * 90.0 * self.progress(now_ms)
    }
}
