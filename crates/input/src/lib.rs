//! Input module (engine-facing).
//!
//! This crate is independent of any UI framework. It maps `crossterm` key
//! events and free-form text into [`crate::types::InputCommand`]s. Both paths
//! produce only the closed move vocabulary (`F B R L U D`, optionally primed)
//! plus the app commands.

pub mod map;
pub mod token;

pub use cube_tutor_types as types;

pub use map::{handle_key_event, should_quit};
pub use token::{parse_line, parse_moves, CommandList, MAX_SEQUENCE};
