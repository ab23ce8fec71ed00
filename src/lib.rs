//! Cube Tutor (workspace facade crate).
//!
//! Re-exports the member crates under short names and holds the
//! application shell used by the `cube-tutor` binary.

pub use cube_tutor_adapter as adapter;
pub use cube_tutor_core as core;
pub use cube_tutor_input as input;
pub use cube_tutor_term as term;
pub use cube_tutor_types as types;

pub mod app;
pub mod config;
pub mod logging;
pub mod remote;
pub mod store;

/// Wall-clock milliseconds since the Unix epoch.
///
/// The engine clock uses wall time so a saved practice session resumes with
/// the right elapsed time after a restart.
pub fn unix_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
