//! Text token parsing.
//!
//! Typed commands and speech-to-text transcripts both arrive as free text.
//! This module turns them into commands: plain notation (`R U R' U'`),
//! spelled-out moves (`right prime`, `top inverse`) and app words (`undo`,
//! `scramble`, `practice`).

use arrayvec::ArrayVec;

use crate::types::{CubeError, Direction, Face, InputCommand, Move, SessionMode};

/// Longest sequence accepted from a single line of text.
pub const MAX_SEQUENCE: usize = 32;

pub type CommandList = ArrayVec<InputCommand, MAX_SEQUENCE>;

fn is_prime_word(word: &str) -> bool {
    matches!(
        word,
        "'" | "prime" | "inverse" | "inverted" | "counterclockwise" | "anticlockwise" | "ccw"
    )
}

fn is_clockwise_word(word: &str) -> bool {
    matches!(word, "clockwise" | "cw")
}

fn command_word(word: &str) -> Option<InputCommand> {
    let cmd = match word {
        "undo" | "back" => InputCommand::Undo,
        "reset" => InputCommand::Reset,
        "scramble" | "shuffle" => InputCommand::Scramble,
        "next" => InputCommand::NextStep,
        "previous" | "prev" => InputCommand::PrevStep,
        "faster" => InputCommand::SpeedUp,
        "slower" => InputCommand::SpeedDown,
        other => InputCommand::SetMode(SessionMode::from_name(other)?),
    };
    Some(cmd)
}

/// Parse a line of text into commands.
///
/// Words are case-insensitive and may be separated by whitespace or commas.
/// "back" alone means undo; "back prime" or `B'` is a move.
pub fn parse_line(text: &str) -> Result<CommandList, CubeError> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .collect();

    let mut out = CommandList::new();
    let mut i = 0;
    while i < words.len() {
        let word = words[i];
        let next = words.get(i + 1).copied();

        let face_word = Face::from_name(word).ok();
        let spelled_face = match (word, next) {
            // "back" is both a face and a command; only a direction word
            // following it makes it a face.
            ("back", Some(n)) if is_prime_word(n) || is_clockwise_word(n) => Some(Face::Back),
            ("back", _) => None,
            _ => face_word,
        };

        let cmd = if let Some(face) = spelled_face {
            let direction = match next {
                Some(n) if is_prime_word(n) => {
                    i += 1;
                    Direction::CounterClockwise
                }
                Some(n) if is_clockwise_word(n) => {
                    i += 1;
                    Direction::Clockwise
                }
                _ => Direction::Clockwise,
            };
            InputCommand::Move(Move::new(face, direction))
        } else if let Ok(mv) = Move::parse(word) {
            InputCommand::Move(mv)
        } else if let Some(cmd) = command_word(word) {
            cmd
        } else {
            return Err(CubeError::InvalidNotation(word.to_string()));
        };

        out.try_push(cmd)
            .map_err(|_| CubeError::InvalidNotation(format!("more than {MAX_SEQUENCE} commands")))?;
        i += 1;
    }

    Ok(out)
}

/// Parse a line that must contain only moves.
pub fn parse_moves(text: &str) -> Result<ArrayVec<Move, MAX_SEQUENCE>, CubeError> {
    let mut out = ArrayVec::new();
    for cmd in parse_line(text)? {
        match cmd {
            InputCommand::Move(mv) => out.push(mv),
            other => return Err(CubeError::InvalidNotation(format!("{other:?}"))),
        }
    }
    Ok(out)
}
