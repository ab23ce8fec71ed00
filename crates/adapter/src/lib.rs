//! Remote control of the cube over a TCP socket with a JSON protocol
//!
//! External agents (solvers, test harnesses, bots) connect and drive the
//! same engine the keyboard drives.
//!
//! # Protocol Overview
//!
//! Line-delimited JSON over TCP:
//!
//! 1. **Connection**: client connects (default `127.0.0.1:7878`)
//! 2. **Handshake**: client sends `hello`, server replies `welcome` with its
//!    `client_id` and role
//! 3. **Controller Assignment**: the first client to hello becomes the
//!    controller; the rest observe
//! 4. **Commanding**: the controller sends `command` messages; each is
//!    acknowledged with `ack` once the app applied it
//! 5. **Observation Streaming**: clients that asked for it receive an
//!    `observation` after every state change
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: client info, protocol version, `stream_observations`
//! - **command**: exactly one of `moves` (notation list, at most 32),
//!   `action` (`undo`, `reset`, `scramble`, `next_step`, `prev_step`) or
//!   `mode` (`tutorial`, `practice`, `free`)
//! - **control**: `claim` or `release` the controller role
//!
//! ## Server → Client
//!
//! - **welcome**, **ack**, **error**, **observation**
//!
//! Error codes: `handshake_required`, `protocol_mismatch`, `not_controller`,
//! `controller_active`, `invalid_command`, `backpressure`.
//!
//! # Environment Variables
//!
//! - `CUBE_AI_HOST`: bind address (default "127.0.0.1")
//! - `CUBE_AI_PORT`: port (default 7878, 0 picks a free port)
//! - `CUBE_AI_MAX_PENDING`: bounded command queue length (default 10)
//! - `CUBE_AI_DISABLED`: "1" or "true" disables the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"moves":[],"is_solved":true,...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"moves":["R","U'"]}
//! Server -> Client: {"type":"ack","seq":2,"status":"ok","applied":2,"dropped":0}
//! Server -> Client: {"type":"observation","seq":2,"moves":["R","U'"],"is_solved":false,...}
//! ```

pub use cube_tutor_core as core;
pub use cube_tutor_types as types;

pub mod protocol;
pub mod runtime;
pub mod server;

pub use protocol::{build_observation, create_ack, create_error, ErrorCode, ObservationMessage};
pub use runtime::{Adapter, AdapterStatus, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, ServerConfig};
