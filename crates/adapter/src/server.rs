//! TCP server for the remote adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use arrayvec::ArrayVec;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch, RwLock};

use crate::protocol::*;
use crate::runtime::{AdapterStatus, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::InputCommand;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7878;
pub const DEFAULT_MAX_PENDING: usize = 10;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    pub disabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: DEFAULT_MAX_PENDING,
            disabled: false,
        }
    }
}

impl ServerConfig {
    /// Create from `CUBE_AI_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = get("CUBE_AI_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = get("CUBE_AI_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = get("CUBE_AI_MAX_PENDING")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let disabled = get("CUBE_AI_DISABLED")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
            disabled,
        }
    }

    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn is_truthy(v: &str) -> bool {
    let v = v.trim();
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<u64>>,
    status_tx: watch::Sender<AdapterStatus>,
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: u64,
    pub addr: SocketAddr,
    pub is_controller: bool,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
pub enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

impl ServerState {
    fn new(config: ServerConfig, status_tx: watch::Sender<AdapterStatus>) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
            status_tx,
        }
    }

    async fn is_handshaken(&self, client_id: u64) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: u64) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Record `seq` for the client. Returns false if it does not increase.
    async fn check_and_update_seq(&self, client_id: u64, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn set_controller(&self, controller: &mut Option<u64>, id: Option<u64>) {
        *controller = id;
        let mut clients = self.clients.write().await;
        for c in clients.iter_mut() {
            c.is_controller = Some(c.id) == id;
        }
    }

    async fn publish_status(&self) {
        let controller_id = *self.controller.read().await;
        let clients = self.clients.read().await;
        let status = AdapterStatus {
            clients: clients.iter().filter(|c| c.handshaken).count(),
            controller_id,
        };
        self.status_tx.send_replace(status);
    }

    async fn send_to(&self, client_id: u64, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }
}

/// Start the TCP server.
///
/// `ready_tx` receives the bound address once the listener is up.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    status_tx: watch::Sender<AdapterStatus>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_target())
        .await
        .with_context(|| format!("bind {}:{}", config.host, config.port))?;
    let bound = listener.local_addr()?;
    tracing::info!(addr = %bound, "adapter server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config, status_tx));
    let mut client_id_counter = 0u64;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        state.send_to(client_id, ClientOutbound::Error(err)).await;
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state
                            .send_to(client_id, ClientOutbound::Observation(obs))
                            .await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        let clients = state.clients.read().await;
                        for c in clients.iter().filter(|c| c.stream_observations) {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        tracing::info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, Arc::clone(&state), command_tx).await
            {
                tracing::warn!(client_id, error = %e, "client error");
            }
            disconnect(&state, client_id).await;
            tracing::info!(client_id, "client disconnected");
        });
    }
}

/// Serialize `msg` as one JSON line into `buf`.
fn encode_line<T: Serialize>(msg: &T, buf: &mut Vec<u8>) -> serde_json::Result<()> {
    buf.clear();
    serde_json::to_writer(&mut *buf, msg)?;
    buf.push(b'\n');
    Ok(())
}

fn encode_outbound(msg: &ClientOutbound, buf: &mut Vec<u8>) -> serde_json::Result<()> {
    match msg {
        ClientOutbound::Welcome(m) => encode_line(m, buf),
        ClientOutbound::Ack(m) => encode_line(m, buf),
        ClientOutbound::Error(m) => encode_line(m, buf),
        ClientOutbound::Observation(m) => encode_line(m, buf),
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: u64,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        is_controller: false,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            if let Err(e) = encode_outbound(&msg, &mut buf) {
                tracing::warn!(client_id, error = %e, "encode failed");
                continue;
            }
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        tracing::trace!(client_id, line = trimmed, "recv");

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                let handshaken = state.is_handshaken(client_id).await;
                if handshaken && !state.check_and_update_seq(client_id, hello.seq).await {
                    reply_error(hello.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let major = state.config.protocol_version.split('.').next().unwrap_or("");
                if hello.protocol_version.split('.').next() != Some(major) {
                    reply_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                {
                    let mut clients = state.clients.write().await;
                    if let Some(c) = clients.iter_mut().find(|c| c.id == client_id) {
                        c.handshaken = true;
                        c.last_seq = Some(hello.seq);
                        c.stream_observations = hello.requested.stream_observations;
                    }
                }

                // First client to hello becomes controller.
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    if controller.is_none() {
                        state.set_controller(&mut *controller, Some(client_id)).await;
                        tracing::info!(client_id, client = %hello.client.name, "controller assigned");
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, *controller)
                };

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id,
                    role,
                    controller_id,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));
                state.publish_status().await;

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(cmd.seq, ErrorCode::HandshakeRequired, "send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    reply_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !state.is_controller(client_id).await {
                    reply_error(cmd.seq, ErrorCode::NotController, "only the controller may send commands");
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err(message) => {
                        reply_error(cmd.seq, ErrorCode::InvalidCommand, &message);
                        continue;
                    }
                };

                // Ack is sent by the event loop once the command is applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    reply_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !state.is_handshaken(client_id).await {
                    reply_error(ctrl.seq, ErrorCode::HandshakeRequired, "send hello before control");
                    continue;
                }
                if !state.check_and_update_seq(client_id, ctrl.seq).await {
                    reply_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let mut controller = state.controller.write().await;
                let result = match ctrl.action {
                    ControlAction::Claim if controller.is_none() || *controller == Some(client_id) => {
                        state.set_controller(&mut *controller, Some(client_id)).await;
                        Ok(())
                    }
                    ControlAction::Claim => Err((ErrorCode::ControllerActive, "controller already assigned")),
                    ControlAction::Release if *controller == Some(client_id) => {
                        state.set_controller(&mut *controller, None).await;
                        Ok(())
                    }
                    ControlAction::Release => Err((ErrorCode::NotController, "only the controller may release")),
                };
                drop(controller);

                match result {
                    Ok(()) => {
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, 0, 0)));
                        state.publish_status().await;
                    }
                    Err((code, message)) => reply_error(ctrl.seq, code, message),
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, unknown.seq).await
                {
                    reply_error(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                reply_error(unknown.seq, ErrorCode::InvalidCommand, "unknown message type");
            }

            Err(e) => {
                let seq = serde_json::from_str::<serde_json::Value>(trimmed)
                    .ok()
                    .and_then(|v| v.get("seq").and_then(|s| s.as_u64()))
                    .unwrap_or(0);
                reply_error(seq, ErrorCode::InvalidCommand, &format!("invalid message: {e}"));
            }
        }
    }

    drop(reply_error);
    drop(tx);
    // The handle in `state.clients` still holds a sender; removing it in
    // `disconnect` ends the writer.
    disconnect(&state, client_id).await;
    let _ = write_task.await;
    Ok(())
}

/// Remove a client, promoting the lowest remaining handshaken id if it
/// held control.
async fn disconnect(state: &ServerState, client_id: u64) {
    let mut controller = state.controller.write().await;
    let removed = {
        let mut clients = state.clients.write().await;
        let before = clients.len();
        clients.retain(|c| c.id != client_id);
        before != clients.len()
    };
    if !removed {
        return;
    }

    if *controller == Some(client_id) {
        let next = {
            let clients = state.clients.read().await;
            clients.iter().filter(|c| c.handshaken).map(|c| c.id).min()
        };
        state.set_controller(&mut *controller, next).await;
        match next {
            Some(id) => tracing::info!(client_id = id, "controller promoted"),
            None => tracing::info!(client_id, "controller released"),
        }
    }
    drop(controller);
    state.publish_status().await;
}

/// Turn a protocol command into engine commands.
///
/// Exactly one of `moves`, `action` and `mode` must be set.
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, String> {
    let mut commands = ArrayVec::<InputCommand, MAX_COMMAND_MOVES>::new();
    match (&cmd.moves, cmd.action, cmd.mode) {
        (Some(moves), None, None) => {
            if moves.0.is_empty() {
                return Err("moves must not be empty".to_string());
            }
            commands.extend(moves.0.iter().map(|&mv| InputCommand::Move(mv)));
        }
        (None, Some(action), None) => commands.push(action.to_command()),
        (None, None, Some(ModeName(mode))) => commands.push(InputCommand::SetMode(mode)),
        (None, None, None) => {
            return Err("command needs one of moves, action or mode".to_string());
        }
        _ => return Err("command takes only one of moves, action or mode".to_string()),
    }
    Ok(ClientCommand { commands })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Face, Move, SessionMode};

    fn command(json: &str) -> CommandMessage {
        match parse_message(json).unwrap() {
            ParsedMessage::Command(c) => c,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_config_from_lookup() {
        let cfg = ServerConfig::from_lookup(|k| match k {
            "CUBE_AI_HOST" => Some("0.0.0.0".to_string()),
            "CUBE_AI_PORT" => Some("9000".to_string()),
            "CUBE_AI_DISABLED" => Some("TRUE".to_string()),
            _ => None,
        });
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.max_pending_commands, DEFAULT_MAX_PENDING);
        assert!(cfg.disabled);
    }

    #[test]
    fn test_config_bad_values_fall_back() {
        let cfg = ServerConfig::from_lookup(|k| match k {
            "CUBE_AI_PORT" => Some("not-a-port".to_string()),
            "CUBE_AI_HOST" => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn test_map_moves() {
        let mapped = map_command(&command(r#"{"type":"command","seq":1,"moves":["R","U'"]}"#)).unwrap();
        assert_eq!(
            mapped.commands.as_slice(),
            &[
                InputCommand::Move(Move::cw(Face::Right)),
                InputCommand::Move(Move::ccw(Face::Top)),
            ]
        );
    }

    #[test]
    fn test_map_action_and_mode() {
        let mapped = map_command(&command(r#"{"type":"command","seq":1,"action":"scramble"}"#)).unwrap();
        assert_eq!(mapped.commands.as_slice(), &[InputCommand::Scramble]);

        let mapped = map_command(&command(r#"{"type":"command","seq":1,"mode":"free"}"#)).unwrap();
        assert_eq!(mapped.commands.as_slice(), &[InputCommand::SetMode(SessionMode::Free)]);
    }

    #[test]
    fn test_map_rejects_ambiguous_or_empty() {
        assert!(map_command(&command(r#"{"type":"command","seq":1}"#)).is_err());
        assert!(map_command(&command(r#"{"type":"command","seq":1,"moves":[]}"#)).is_err());
        assert!(
            map_command(&command(r#"{"type":"command","seq":1,"moves":["R"],"action":"undo"}"#))
                .is_err()
        );
    }
}
