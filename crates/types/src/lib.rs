//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application:
//! faces, sticker colors, turn directions, moves and session modes. They are
//! plain data with no engine logic, usable from the engine, the renderers,
//! the input mappers and the remote adapter alike.
//!
//! # Cube Dimensions
//!
//! - **Faces**: 6 (front, back, top, bottom, left, right)
//! - **Stickers per face**: 9, a 3x3 grid flattened row-major (indices 0-8)
//!
//! Every face grid is viewed from outside the cube. Front, right, back and
//! left have row 0 along the top face; top has row 2 along the front face;
//! bottom has row 0 along the front face.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 100 | Practice timer tick interval |
//! | `BASE_ROTATION_MS` | 500 | Quarter-turn animation at speed 1.0 |
//! | `MIN_ANIMATION_SPEED` | 0.25 | Slowest animation speed factor |
//! | `MAX_ANIMATION_SPEED` | 4.0 | Fastest animation speed factor |
//!
//! # Move Notation
//!
//! A move is one face letter (`F`, `B`, `R`, `L`, `U`, `D`), optionally
//! followed by a prime mark (`'`) for a counterclockwise turn.
//!
//! # Examples
//!
//! ```
//! use cube_tutor_types::{Direction, Face, Move};
//!
//! let mv: Move = "R'".parse().unwrap();
//! assert_eq!(mv.face, Face::Right);
//! assert_eq!(mv.direction, Direction::CounterClockwise);
//! assert_eq!(mv.notation(), "R'");
//! assert_eq!(mv.inverse().notation(), "R");
//!
//! assert!("X".parse::<Move>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of faces on the cube.
pub const FACE_COUNT: usize = 6;

/// Number of stickers on each face (3x3).
pub const STICKERS_PER_FACE: usize = 9;

/// Practice timer tick interval in milliseconds.
pub const TICK_MS: u32 = 100;

/// Duration of one quarter-turn animation at speed 1.0.
pub const BASE_ROTATION_MS: u32 = 500;

/// Default animation speed factor.
pub const DEFAULT_ANIMATION_SPEED: f32 = 1.0;

/// Slowest accepted animation speed factor.
pub const MIN_ANIMATION_SPEED: f32 = 0.25;

/// Fastest accepted animation speed factor.
pub const MAX_ANIMATION_SPEED: f32 = 4.0;

/// Number of best practice times kept in progress.
pub const BEST_TIMES_KEPT: usize = 5;

/// Default scramble length for practice mode.
pub const DEFAULT_SCRAMBLE_LEN: usize = 20;

/// Errors raised by the engine for malformed identifiers.
///
/// These represent programming or protocol errors, never expected runtime
/// conditions: a busy engine or an empty history are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CubeError {
    /// A face identifier outside the six known faces.
    #[error("invalid face identifier '{0}'")]
    InvalidFace(String),

    /// A move token outside the closed notation vocabulary.
    #[error("invalid move notation '{0}'")]
    InvalidNotation(String),
}

/// The six faces of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Back,
    Top,
    Bottom,
    Left,
    Right,
}

impl Face {
    /// All faces in storage order.
    pub const ALL: [Face; FACE_COUNT] = [
        Face::Front,
        Face::Back,
        Face::Top,
        Face::Bottom,
        Face::Left,
        Face::Right,
    ];

    /// Storage index (0-5), matching [`Face::ALL`].
    pub fn index(self) -> usize {
        match self {
            Face::Front => 0,
            Face::Back => 1,
            Face::Top => 2,
            Face::Bottom => 3,
            Face::Left => 4,
            Face::Right => 5,
        }
    }

    /// Notation letter for this face.
    ///
    /// ```
    /// use cube_tutor_types::Face;
    ///
    /// assert_eq!(Face::Top.letter(), 'U');
    /// assert_eq!(Face::Bottom.letter(), 'D');
    /// ```
    pub fn letter(self) -> char {
        match self {
            Face::Front => 'F',
            Face::Back => 'B',
            Face::Top => 'U',
            Face::Bottom => 'D',
            Face::Left => 'L',
            Face::Right => 'R',
        }
    }

    /// Parse a notation letter (case-insensitive).
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'F' => Some(Face::Front),
            'B' => Some(Face::Back),
            'U' => Some(Face::Top),
            'D' => Some(Face::Bottom),
            'L' => Some(Face::Left),
            'R' => Some(Face::Right),
            _ => None,
        }
    }

    /// Lowercase face name.
    pub fn as_str(self) -> &'static str {
        match self {
            Face::Front => "front",
            Face::Back => "back",
            Face::Top => "top",
            Face::Bottom => "bottom",
            Face::Left => "left",
            Face::Right => "right",
        }
    }

    /// Parse a face name.
    ///
    /// Accepts the lowercase names (`"front"`, `"top"`, ...) and the common
    /// aliases `"up"` and `"down"`. Anything else is an
    /// [`CubeError::InvalidFace`].
    pub fn from_name(s: &str) -> Result<Self, CubeError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(Face::Front),
            "back" => Ok(Face::Back),
            "top" | "up" => Ok(Face::Top),
            "bottom" | "down" => Ok(Face::Bottom),
            "left" => Ok(Face::Left),
            "right" => Ok(Face::Right),
            _ => Err(CubeError::InvalidFace(s.to_string())),
        }
    }

    /// Color every sticker of this face has in the solved state.
    pub fn home_color(self) -> Color {
        match self {
            Face::Front => Color::White,
            Face::Back => Color::Yellow,
            Face::Top => Color::Red,
            Face::Bottom => Color::Orange,
            Face::Left => Color::Green,
            Face::Right => Color::Blue,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sticker colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Yellow,
    Red,
    Orange,
    Green,
    Blue,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Yellow => "yellow",
            Color::Red => "red",
            Color::Orange => "orange",
            Color::Green => "green",
            Color::Blue => "blue",
        }
    }

    /// Single-letter code, used by compact text renderings.
    pub fn initial(self) -> char {
        match self {
            Color::White => 'W',
            Color::Yellow => 'Y',
            Color::Red => 'R',
            Color::Orange => 'O',
            Color::Green => 'G',
            Color::Blue => 'B',
        }
    }
}

/// Quarter-turn direction, as seen looking at the turned face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Clockwise,
    #[serde(rename = "counterclockwise")]
    CounterClockwise,
}

impl Direction {
    pub fn inverse(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Clockwise => "clockwise",
            Direction::CounterClockwise => "counterclockwise",
        }
    }
}

/// Notation strings indexed by `face.index() * 2 + direction`.
const NOTATIONS: [&str; FACE_COUNT * 2] = [
    "F", "F'", "B", "B'", "U", "U'", "D", "D'", "L", "L'", "R", "R'",
];

/// A single quarter turn of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub face: Face,
    pub direction: Direction,
}

impl Move {
    pub const fn new(face: Face, direction: Direction) -> Self {
        Self { face, direction }
    }

    pub const fn cw(face: Face) -> Self {
        Self::new(face, Direction::Clockwise)
    }

    pub const fn ccw(face: Face) -> Self {
        Self::new(face, Direction::CounterClockwise)
    }

    /// The move that undoes this one.
    pub fn inverse(self) -> Self {
        Self::new(self.face, self.direction.inverse())
    }

    /// Canonical notation token (`"R"`, `"R'"`, ...).
    pub fn notation(self) -> &'static str {
        let dir = match self.direction {
            Direction::Clockwise => 0,
            Direction::CounterClockwise => 1,
        };
        NOTATIONS[self.face.index() * 2 + dir]
    }

    /// Parse a notation token.
    ///
    /// Accepts a face letter (any case) with an optional prime mark; the
    /// typographic prime (`’`) is accepted as well.
    pub fn parse(s: &str) -> Result<Self, CubeError> {
        let token = s.trim();
        let mut chars = token.chars();
        let face = chars
            .next()
            .and_then(Face::from_letter)
            .ok_or_else(|| CubeError::InvalidNotation(s.to_string()))?;
        let direction = match chars.next() {
            None => Direction::Clockwise,
            Some('\'') | Some('’') => Direction::CounterClockwise,
            Some(_) => return Err(CubeError::InvalidNotation(s.to_string())),
        };
        if chars.next().is_some() {
            return Err(CubeError::InvalidNotation(s.to_string()));
        }
        Ok(Self::new(face, direction))
    }
}

impl FromStr for Move {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::parse(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}

impl Serialize for Move {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.notation())
    }
}

impl<'de> Deserialize<'de> for Move {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Move::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Session modes. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Guided tutorial; moves are validated against the current step.
    #[default]
    Tutorial,
    /// Timed practice.
    Practice,
    /// Free play, no validation and no timer.
    Free,
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Tutorial => "tutorial",
            SessionMode::Practice => "practice",
            SessionMode::Free => "free",
        }
    }

    /// Parse a mode name (case-insensitive).
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tutorial" => Some(SessionMode::Tutorial),
            "practice" => Some(SessionMode::Practice),
            "free" => Some(SessionMode::Free),
            _ => None,
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a user (keyboard, typed text, remote client) can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    Move(Move),
    Undo,
    Reset,
    Scramble,
    SetMode(SessionMode),
    NextStep,
    PrevStep,
    SpeedUp,
    SpeedDown,
}

/// Multiplicative step for [`InputCommand::SpeedUp`] / [`InputCommand::SpeedDown`].
pub const ANIMATION_SPEED_STEP: f32 = 1.25;

/// Clamp an animation speed factor into the accepted range.
///
/// Non-finite or non-positive input falls back to the default speed.
pub fn clamp_animation_speed(speed: f32) -> f32 {
    if !speed.is_finite() || speed <= 0.0 {
        return DEFAULT_ANIMATION_SPEED;
    }
    speed.clamp(MIN_ANIMATION_SPEED, MAX_ANIMATION_SPEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notation_round_trips_for_every_move() {
        for face in Face::ALL {
            for direction in [Direction::Clockwise, Direction::CounterClockwise] {
                let mv = Move::new(face, direction);
                assert_eq!(Move::parse(mv.notation()), Ok(mv));
            }
        }
    }

    #[test]
    fn notation_is_prime_for_counterclockwise() {
        assert_eq!(Move::cw(Face::Right).notation(), "R");
        assert_eq!(Move::ccw(Face::Right).notation(), "R'");
        assert_eq!(Move::ccw(Face::Top).notation(), "U'");
        assert_eq!(Move::cw(Face::Bottom).notation(), "D");
    }

    #[test]
    fn parse_rejects_tokens_outside_vocabulary() {
        for bad in ["", "X", "R2", "RR", "R''", "M", "x'"] {
            assert!(
                matches!(Move::parse(bad), Err(CubeError::InvalidNotation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_accepts_lowercase_and_typographic_prime() {
        assert_eq!(Move::parse("r"), Ok(Move::cw(Face::Right)));
        assert_eq!(Move::parse("u’"), Ok(Move::ccw(Face::Top)));
    }

    #[test]
    fn face_names_and_aliases() {
        assert_eq!(Face::from_name("Top"), Ok(Face::Top));
        assert_eq!(Face::from_name("up"), Ok(Face::Top));
        assert_eq!(Face::from_name("down"), Ok(Face::Bottom));
        assert_eq!(
            Face::from_name("middle"),
            Err(CubeError::InvalidFace("middle".to_string()))
        );
    }

    #[test]
    fn face_index_matches_all_order() {
        for (i, face) in Face::ALL.iter().enumerate() {
            assert_eq!(face.index(), i);
        }
    }

    #[test]
    fn move_displays_as_notation() {
        assert_eq!(Move::ccw(Face::Left).to_string(), "L'");
        assert_eq!(Move::cw(Face::Front).inverse().to_string(), "F'");
    }

    #[test]
    fn animation_speed_is_clamped() {
        assert_eq!(clamp_animation_speed(10.0), MAX_ANIMATION_SPEED);
        assert_eq!(clamp_animation_speed(0.01), MIN_ANIMATION_SPEED);
        assert_eq!(clamp_animation_speed(-1.0), DEFAULT_ANIMATION_SPEED);
        assert_eq!(clamp_animation_speed(f32::NAN), DEFAULT_ANIMATION_SPEED);
        assert_eq!(clamp_animation_speed(2.0), 2.0);
    }

    #[test]
    fn session_mode_names() {
        assert_eq!(SessionMode::from_name("Practice"), Some(SessionMode::Practice));
        assert_eq!(SessionMode::from_name("zen"), None);
        assert_eq!(SessionMode::default(), SessionMode::Tutorial);
    }
}
