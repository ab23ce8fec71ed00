//! Key mapping from terminal events to cube commands.

use crate::types::{Direction, Face, InputCommand, Move, SessionMode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Map keyboard input to a command.
///
/// Face letters turn clockwise; holding Shift (or typing the uppercase
/// letter) turns counterclockwise.
pub fn handle_key_event(key: KeyEvent) -> Option<InputCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }

    match key.code {
        KeyCode::Char(c) if Face::from_letter(c).is_some() => {
            let face = Face::from_letter(c)?;
            let primed = c.is_ascii_uppercase() || key.modifiers.contains(KeyModifiers::SHIFT);
            let direction = if primed {
                Direction::CounterClockwise
            } else {
                Direction::Clockwise
            };
            Some(InputCommand::Move(Move::new(face, direction)))
        }

        // History
        KeyCode::Backspace | KeyCode::Char('z') | KeyCode::Char('Z') => Some(InputCommand::Undo),
        KeyCode::Char('0') => Some(InputCommand::Reset),
        KeyCode::Char(' ') => Some(InputCommand::Scramble),

        // Modes
        KeyCode::Char('1') => Some(InputCommand::SetMode(SessionMode::Tutorial)),
        KeyCode::Char('2') => Some(InputCommand::SetMode(SessionMode::Practice)),
        KeyCode::Char('3') => Some(InputCommand::SetMode(SessionMode::Free)),

        // Tutorial navigation
        KeyCode::Right | KeyCode::Char(']') | KeyCode::Char('n') | KeyCode::Char('N') => {
            Some(InputCommand::NextStep)
        }
        KeyCode::Left | KeyCode::Char('[') | KeyCode::Char('p') | KeyCode::Char('P') => {
            Some(InputCommand::PrevStep)
        }

        // Animation speed
        KeyCode::Char('+') | KeyCode::Char('=') => Some(InputCommand::SpeedUp),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(InputCommand::SpeedDown),

        _ => None,
    }
}

/// Check if key should quit the app.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
