//! Cube state - faces, move log and the derived solved flag

use serde::{Deserialize, Serialize};

use crate::faces::{is_solved, rotate_face, Faces};
use crate::types::Move;

/// Logical puzzle state.
///
/// `is_solved` is always derived from `faces`; every constructor and
/// transition recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeState {
    faces: Faces,
    moves: Vec<Move>,
    is_solved: bool,
}

impl CubeState {
    /// The initial, solved cube with an empty move log.
    pub fn new() -> Self {
        Self::from_parts(Faces::solved(), Vec::new())
    }

    pub fn from_parts(faces: Faces, moves: Vec<Move>) -> Self {
        Self {
            is_solved: is_solved(&faces),
            faces,
            moves,
        }
    }

    pub fn faces(&self) -> &Faces {
        &self.faces
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn is_solved(&self) -> bool {
        self.is_solved
    }

    pub fn last_move(&self) -> Option<Move> {
        self.moves.last().copied()
    }

    /// Return the state after applying `mv`.
    pub fn applied(&self, mv: Move) -> CubeState {
        let faces = rotate_face(&self.faces, mv.face, mv.direction);
        let mut moves = Vec::with_capacity(self.moves.len() + 1);
        moves.extend_from_slice(&self.moves);
        moves.push(mv);
        Self::from_parts(faces, moves)
    }
}

impl Default for CubeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Face;

    #[test]
    fn new_state_is_solved_and_empty() {
        let s = CubeState::new();
        assert!(s.is_solved());
        assert_eq!(s.move_count(), 0);
        assert_eq!(s.last_move(), None);
    }

    #[test]
    fn applied_leaves_original_untouched() {
        let s = CubeState::new();
        let next = s.applied(Move::cw(Face::Right));

        assert_eq!(s, CubeState::new());
        assert_eq!(next.move_count(), 1);
        assert_eq!(next.last_move(), Some(Move::cw(Face::Right)));
        assert!(!next.is_solved());
    }

    #[test]
    fn inverse_move_resolves() {
        let s = CubeState::new()
            .applied(Move::cw(Face::Front))
            .applied(Move::ccw(Face::Front));
        assert!(s.is_solved());
        assert_eq!(s.move_count(), 2);
    }
}
