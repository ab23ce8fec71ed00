//! Scramble module - deterministic random move sequences for practice
//!
//! Uses a small LCG so a seed always produces the same scramble (handy for
//! tests and for sharing a scramble between two runs). The only guarantee
//! beyond valid notation is that the same face never turns twice in a row.

use crate::types::{Direction, Face, Move, FACE_COUNT};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Random value in [0, max). Uses the high bits; the low bits of an LCG
    /// have short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        (self.next_u32() >> 16) % max.max(1)
    }
}

/// Generate `len` moves from `seed`.
pub fn scramble_moves(seed: u32, len: usize) -> Vec<Move> {
    let mut rng = SimpleRng::new(seed);
    let mut out: Vec<Move> = Vec::with_capacity(len);

    while out.len() < len {
        let face = Face::ALL[rng.next_range(FACE_COUNT as u32) as usize];
        if out.last().map(|m| m.face) == Some(face) {
            continue;
        }
        let direction = if rng.next_range(2) == 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        out.push(Move::new(face, direction));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn test_scramble_length_and_determinism() {
        let a = scramble_moves(7, 20);
        let b = scramble_moves(7, 20);
        assert_eq!(a.len(), 20);
        assert_eq!(a, b);
        assert_ne!(a, scramble_moves(8, 20));
    }

    #[test]
    fn test_no_face_repeats() {
        for seed in 0..50 {
            let moves = scramble_moves(seed, 40);
            for pair in moves.windows(2) {
                assert_ne!(pair[0].face, pair[1].face, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_empty_scramble() {
        assert!(scramble_moves(1, 0).is_empty());
    }
}
