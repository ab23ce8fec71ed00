//! Tutorial module - static step catalog and the move validator
//!
//! A step is validated by comparing the tail of the move log against the
//! step's required sequence. Validation is pure and never fails; it returns
//! a verdict the presentation layer can show as-is.

use crate::types::Face::{Front as FR, Left as LF, Right as RT, Top as UP};
use crate::types::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorialStep {
    pub id: usize,
    pub title: &'static str,
    pub description: &'static str,
    pub required_moves: &'static [Move],
}

impl TutorialStep {
    /// Steps with no required moves (welcome, congratulations) are
    /// informational and can never be "completed".
    pub fn is_practice_step(&self) -> bool {
        !self.required_moves.is_empty()
    }
}

const F: Move = Move::cw(FR);
const F_: Move = Move::ccw(FR);
const R: Move = Move::cw(RT);
const R_: Move = Move::ccw(RT);
const U: Move = Move::cw(UP);
const U_: Move = Move::ccw(UP);
const L: Move = Move::cw(LF);
const L_: Move = Move::ccw(LF);

pub const STEP_COUNT: usize = 8;

pub static STEPS: [TutorialStep; STEP_COUNT] = [
    TutorialStep {
        id: 0,
        title: "Welcome",
        description: "Learn to solve the cube in 7 easy steps",
        required_moves: &[],
    },
    TutorialStep {
        id: 1,
        title: "White Cross",
        description: "Create a white cross on the first face",
        required_moves: &[F, R, U, R_, U_, F_],
    },
    TutorialStep {
        id: 2,
        title: "White Corners",
        description: "Place the white corners in correct positions",
        required_moves: &[R, U, R_, U_],
    },
    TutorialStep {
        id: 3,
        title: "Middle Layer",
        description: "Solve the middle layer edges",
        required_moves: &[U, R, U_, R_, U_, F_, U, F],
    },
    TutorialStep {
        id: 4,
        title: "Yellow Cross",
        description: "Create a yellow cross on the top face",
        required_moves: &[F, R, U, R_, U_, F_],
    },
    TutorialStep {
        id: 5,
        title: "Yellow Edges",
        description: "Position the yellow edges correctly",
        // Half turn of U written as two quarter turns.
        required_moves: &[R, U, R_, U, R, U, U, R_],
    },
    TutorialStep {
        id: 6,
        title: "Yellow Corners",
        description: "Position and orient the yellow corners",
        required_moves: &[R, U_, L_, U, R_, U_, L],
    },
    TutorialStep {
        id: 7,
        title: "Congratulations!",
        description: "You've solved the cube!",
        required_moves: &[],
    },
];

/// Index of the final (congratulations) step.
pub const LAST_STEP: usize = STEP_COUNT - 1;

pub fn steps() -> &'static [TutorialStep] {
    &STEPS
}

pub fn step(index: usize) -> Option<&'static TutorialStep> {
    STEPS.get(index)
}

pub fn step_count() -> usize {
    STEP_COUNT
}

/// Required moves for `index`; out of range reads as "nothing required".
pub fn required_moves(index: usize) -> &'static [Move] {
    step(index).map(|s| s.required_moves).unwrap_or(&[])
}

/// "Step n of 7" style indicator; `None` on the final step.
pub fn progress_label(index: usize) -> Option<String> {
    if index >= LAST_STEP {
        return None;
    }
    Some(format!("Step {} of {}", index + 1, LAST_STEP))
}

pub const MSG_CORRECT: &str = "Correct!";
pub const MSG_TRY_AGAIN: &str = "Try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    pub message: &'static str,
}

impl Validation {
    fn from_verdict(is_valid: bool) -> Self {
        Self {
            is_valid,
            message: if is_valid { MSG_CORRECT } else { MSG_TRY_AGAIN },
        }
    }
}

/// Check whether the tail of `log` equals `required`.
pub fn validate(log: &[Move], required: &[Move]) -> Validation {
    if required.is_empty() {
        return Validation::from_verdict(true);
    }
    if log.len() < required.len() {
        return Validation::from_verdict(false);
    }
    let tail = &log[log.len() - required.len()..];
    Validation::from_verdict(tail == required)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(tokens: &[&str]) -> Vec<Move> {
        tokens.iter().map(|t| t.parse().unwrap()).collect()
    }

    #[test]
    fn test_catalog_shape() {
        assert_eq!(step_count(), 8);
        assert!(required_moves(0).is_empty());
        assert!(required_moves(LAST_STEP).is_empty());
        for (i, s) in steps().iter().enumerate() {
            assert_eq!(s.id, i);
        }
        for i in 1..LAST_STEP {
            assert!(step(i).unwrap().is_practice_step());
        }
    }

    #[test]
    fn test_step_one_sequence() {
        assert_eq!(
            required_moves(1),
            parse_all(&["F", "R", "U", "R'", "U'", "F'"]).as_slice()
        );
    }

    #[test]
    fn test_half_turn_expanded() {
        assert_eq!(
            required_moves(5),
            parse_all(&["R", "U", "R'", "U", "R", "U", "U", "R'"]).as_slice()
        );
    }

    #[test]
    fn test_empty_requirement_is_valid() {
        let v = validate(&[], &[]);
        assert!(v.is_valid);
        assert_eq!(v.message, MSG_CORRECT);
        assert!(validate(&parse_all(&["R"]), &[]).is_valid);
    }

    #[test]
    fn test_tail_match() {
        let log = parse_all(&["D", "R", "U", "R'", "U'"]);
        let v = validate(&log, required_moves(2));
        assert!(v.is_valid);
        assert_eq!(v.message, "Correct!");
    }

    #[test]
    fn test_short_log_never_matches() {
        let log = parse_all(&["R", "U"]);
        let v = validate(&log, required_moves(2));
        assert!(!v.is_valid);
        assert_eq!(v.message, "Try again");
    }

    #[test]
    fn test_prime_is_distinct() {
        let log = parse_all(&["R", "U", "R", "U'"]);
        assert!(!validate(&log, required_moves(2)).is_valid);
    }

    #[test]
    fn test_out_of_range_step() {
        assert!(step(99).is_none());
        assert!(required_moves(99).is_empty());
    }

    #[test]
    fn test_progress_label() {
        assert_eq!(progress_label(0).as_deref(), Some("Step 1 of 7"));
        assert_eq!(progress_label(6).as_deref(), Some("Step 7 of 7"));
        assert_eq!(progress_label(LAST_STEP), None);
    }
}
