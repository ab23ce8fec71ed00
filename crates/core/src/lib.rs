//! Core cube logic - pure, deterministic, and testable
//!
//! This crate contains the puzzle model, the undo history, the session state
//! machine and the tutorial validator. It has **no dependencies** on the
//! terminal, networking, or the file system:
//!
//! - **Deterministic**: time is passed in as `now_ms`, scrambles are seeded
//! - **Testable**: every rule has unit tests next to it
//! - **Portable**: runs the same under the TUI, the TCP adapter or a test
//!
//! # Module Structure
//!
//! - [`faces`]: six 3x3 sticker grids, quarter-turn rotation, solved check
//! - [`cube`]: faces plus the move log
//! - [`history`]: undo stack of pre-move snapshots
//! - [`session`]: mode, tutorial step, practice timer, motion token
//! - [`tutorial`]: static step catalog and tail-match validator
//! - [`engine`]: [`CubeEngine`], the facade that owns all of the above
//! - [`snapshot`]: owned read-only view for renderers
//! - [`persisted`] / [`progress`]: JSON records for the app shell
//! - [`scramble`]: seeded random move sequences
//!
//! # Example
//!
//! ```
//! use cube_tutor_core::CubeEngine;
//!
//! let mut engine = CubeEngine::new();
//! engine.apply_notation("R").unwrap();
//! assert!(!engine.is_solved());
//!
//! engine.undo();
//! assert!(engine.is_solved());
//! ```

pub mod cube;
pub mod engine;
pub mod faces;
pub mod history;
pub mod persisted;
pub mod progress;
pub mod scramble;
pub mod session;
pub mod snapshot;
pub mod tutorial;

pub use cube_tutor_types as types;

// Re-export commonly used types for convenience
pub use cube::CubeState;
pub use engine::{Applied, CubeEngine, MoveOutcome};
pub use faces::{is_solved, rotate_face, rotate_face_named, Faces};
pub use history::{History, HistoryEntry};
pub use persisted::PersistedState;
pub use progress::{format_time, Progress};
pub use scramble::{scramble_moves, SimpleRng};
pub use session::{settle_duration_ms, Admission, Motion, Session};
pub use snapshot::EngineSnapshot;
pub use tutorial::{validate, TutorialStep, Validation};
