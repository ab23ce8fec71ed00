//! Protocol module - JSON message types for remote control
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sender sequence
//! number) and `ts` (sender timestamp in ms).

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::core::{EngineSnapshot, Faces};
use crate::types::{InputCommand, Move, SessionMode};

pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Most moves accepted in a single `command`.
pub const MAX_COMMAND_MOVES: usize = 32;

// ============== Client -> App Messages ==============

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type", default = "hello_type")]
    pub msg_type: String,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

fn hello_type() -> String {
    "hello".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default)]
    pub stream_observations: bool,
}

/// Command message (controller only). Exactly one of `moves`, `action` or
/// `mode` must be present.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    #[serde(default)]
    pub moves: Option<MoveList>,
    #[serde(default)]
    pub action: Option<ActionName>,
    #[serde(default)]
    pub mode: Option<ModeName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionName {
    Undo,
    Reset,
    Scramble,
    NextStep,
    PrevStep,
}

impl ActionName {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionName::Undo => "undo",
            ActionName::Reset => "reset",
            ActionName::Scramble => "scramble",
            ActionName::NextStep => "next_step",
            ActionName::PrevStep => "prev_step",
        }
    }

    pub fn to_command(self) -> InputCommand {
        match self {
            ActionName::Undo => InputCommand::Undo,
            ActionName::Reset => InputCommand::Reset,
            ActionName::Scramble => InputCommand::Scramble,
            ActionName::NextStep => InputCommand::NextStep,
            ActionName::PrevStep => InputCommand::PrevStep,
        }
    }
}

impl<'de> Deserialize<'de> for ActionName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        [
            ActionName::Undo,
            ActionName::Reset,
            ActionName::Scramble,
            ActionName::NextStep,
            ActionName::PrevStep,
        ]
        .into_iter()
        .find(|a| s.eq_ignore_ascii_case(a.as_str()))
        .ok_or_else(|| serde::de::Error::custom(format!("unknown action: {s}")))
    }
}

/// Session mode name, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeName(pub SessionMode);

impl<'de> Deserialize<'de> for ModeName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        SessionMode::from_name(&s)
            .map(ModeName)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown mode: {s}")))
    }
}

/// Bounded list of move notations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveList(pub ArrayVec<Move, MAX_COMMAND_MOVES>);

impl<'de> Deserialize<'de> for MoveList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = MoveList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of move notations")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<Move, MAX_COMMAND_MOVES>::new();
                while let Some(mv) = seq.next_element::<Move>()? {
                    out.try_push(mv)
                        .map_err(|_| serde::de::Error::custom("too many moves"))?;
                }
                Ok(MoveList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Claim,
    Release,
}

impl<'de> Deserialize<'de> for ControlAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("claim") {
            Ok(Self::Claim)
        } else if s.eq_ignore_ascii_case("release") {
            Ok(Self::Release)
        } else {
            Err(serde::de::Error::custom("invalid control action"))
        }
    }
}

// ============== App -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignedRole {
    Controller,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    Backpressure,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub app_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: Vec<String>,
    pub moves: Vec<String>,
    pub actions: Vec<String>,
    pub modes: Vec<String>,
    pub max_moves_per_command: usize,
}

/// Acknowledgment, sent once the app has applied a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub status: String,
    /// Moves committed to the cube.
    pub applied: u32,
    /// Moves rejected because an animated move was still settling.
    pub dropped: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSnapshot {
    pub is_valid: bool,
    pub message: std::borrow::Cow<'static, str>,
}

/// Full engine state sent to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub seq: u64,
    pub ts: u64,
    pub faces: Faces,
    pub moves: Vec<Move>,
    pub move_count: usize,
    pub history_len: usize,
    pub is_solved: bool,
    pub mode: SessionMode,
    pub current_step: usize,
    pub validation: ValidationSnapshot,
    pub elapsed_ms: u64,
    pub busy: bool,
    pub state_hash: String,
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse one JSON line.
///
/// An unrecognized `type` is not a parse error; it yields
/// [`ParsedMessage::Unknown`] so the server can answer with a proper error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    struct Envelope {
        #[serde(rename = "type")]
        msg_type: Option<String>,
        seq: Option<u64>,
    }

    let envelope: Envelope = serde_json::from_str(json)?;
    match envelope.msg_type.as_deref() {
        Some("hello") => Ok(ParsedMessage::Hello(serde_json::from_str(json)?)),
        Some("command") => Ok(ParsedMessage::Command(serde_json::from_str(json)?)),
        Some("control") => Ok(ParsedMessage::Control(serde_json::from_str(json)?)),
        _ => Ok(ParsedMessage::Unknown(UnknownMessage {
            seq: envelope.seq.unwrap_or(0),
        })),
    }
}

// ============== Utility Functions ==============

pub fn create_hello(seq: u64, client_name: &str, stream_observations: bool) -> HelloMessage {
    HelloMessage {
        msg_type: hello_type(),
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        requested: RequestedCapabilities {
            stream_observations,
        },
    }
}

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    let moves = crate::types::Face::ALL
        .iter()
        .flat_map(|&f| [Move::cw(f), Move::ccw(f)])
        .map(|m| m.notation().to_string())
        .collect();
    WelcomeMessage {
        msg_type: "welcome".to_string(),
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        app_id: "cube-tutor".to_string(),
        capabilities: ServerCapabilities {
            formats: vec!["json".to_string()],
            moves,
            actions: ["undo", "reset", "scramble", "next_step", "prev_step"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            modes: [SessionMode::Tutorial, SessionMode::Practice, SessionMode::Free]
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
            max_moves_per_command: MAX_COMMAND_MOVES,
        },
    }
}

pub fn create_ack(seq: u64, applied: u32, dropped: u32) -> AckMessage {
    AckMessage {
        msg_type: "ack".to_string(),
        seq,
        ts: current_timestamp_ms(),
        status: "ok".to_string(),
        applied,
        dropped,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: "error".to_string(),
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Build an observation from an engine snapshot.
pub fn build_observation(snap: &EngineSnapshot, seq: u64) -> ObservationMessage {
    ObservationMessage {
        msg_type: "observation".to_string(),
        seq,
        ts: current_timestamp_ms(),
        faces: snap.faces,
        moves: snap.moves.clone(),
        move_count: snap.move_count(),
        history_len: snap.history_len,
        is_solved: snap.is_solved,
        mode: snap.mode,
        current_step: snap.current_step,
        validation: ValidationSnapshot {
            is_valid: snap.validation.is_valid,
            message: std::borrow::Cow::Borrowed(snap.validation.message),
        },
        elapsed_ms: snap.elapsed_ms,
        busy: snap.busy(),
        state_hash: format!("{:016x}", state_hash(snap)),
    }
}

/// Stable 64-bit FNV-1a over the cube-relevant parts of a snapshot.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions, so
/// the hash is computed by hand over a canonical byte encoding.
pub fn state_hash(snap: &EngineSnapshot) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut h = OFFSET_BASIS;
    let mut feed = |b: u8| {
        h ^= b as u64;
        h = h.wrapping_mul(PRIME);
    };

    for (_, stickers) in snap.faces.iter() {
        for c in stickers {
            feed(c.initial() as u8);
        }
    }
    for mv in &snap.moves {
        for b in mv.notation().bytes() {
            feed(b);
        }
    }
    for b in snap.mode.as_str().bytes() {
        feed(b);
    }
    for b in (snap.current_step as u64).to_le_bytes() {
        feed(b);
    }
    h
}

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CubeEngine;

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":5,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Hello(h) => {
                assert_eq!(h.seq, 1);
                assert_eq!(h.client.name, "bot");
                assert!(h.requested.stream_observations);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_command_moves() {
        let json = r#"{"type":"command","seq":2,"ts":0,"moves":["R","U'","f"]}"#;
        let ParsedMessage::Command(cmd) = parse_message(json).unwrap() else {
            panic!("expected command");
        };
        let moves = cmd.moves.unwrap().0;
        assert_eq!(moves.len(), 3);
        assert_eq!(moves[1], Move::parse("U'").unwrap());
        assert!(cmd.action.is_none());
    }

    #[test]
    fn test_parse_command_action_and_mode() {
        let ParsedMessage::Command(cmd) =
            parse_message(r#"{"type":"command","seq":3,"action":"UNDO"}"#).unwrap()
        else {
            panic!("expected command");
        };
        assert_eq!(cmd.action, Some(ActionName::Undo));

        let ParsedMessage::Command(cmd) =
            parse_message(r#"{"type":"command","seq":4,"mode":"practice"}"#).unwrap()
        else {
            panic!("expected command");
        };
        assert_eq!(cmd.mode, Some(ModeName(SessionMode::Practice)));
    }

    #[test]
    fn test_bad_notation_is_parse_error() {
        assert!(parse_message(r#"{"type":"command","seq":2,"moves":["X"]}"#).is_err());
    }

    #[test]
    fn test_too_many_moves() {
        let moves = vec!["\"R\""; MAX_COMMAND_MOVES + 1].join(",");
        let json = format!(r#"{{"type":"command","seq":2,"moves":[{moves}]}}"#);
        assert!(parse_message(&json).is_err());
    }

    #[test]
    fn test_unknown_type() {
        match parse_message(r#"{"type":"dance","seq":9}"#).unwrap() {
            ParsedMessage::Unknown(u) => assert_eq!(u.seq, 9),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_code_wire_names() {
        let e = create_error(1, ErrorCode::HandshakeRequired, "x");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["code"], "handshake_required");
        assert_eq!(v["type"], "error");
    }

    #[test]
    fn test_observation_fields() {
        let mut engine = CubeEngine::new();
        engine.apply_notation("R").unwrap();
        let obs = build_observation(&engine.snapshot(), 7);
        let v = serde_json::to_value(&obs).unwrap();

        assert_eq!(v["type"], "observation");
        assert_eq!(v["moves"][0], "R");
        assert_eq!(v["is_solved"], false);
        assert_eq!(v["mode"], "tutorial");
        assert_eq!(v["faces"]["front"].as_array().unwrap().len(), 9);
        assert_eq!(obs.state_hash.len(), 16);
    }

    #[test]
    fn test_state_hash_tracks_cube() {
        let mut engine = CubeEngine::new();
        let before = state_hash(&engine.snapshot());
        engine.apply_notation("U").unwrap();
        let after = state_hash(&engine.snapshot());
        assert_ne!(before, after);

        engine.undo();
        assert_eq!(state_hash(&engine.snapshot()), before);
    }
}
