//! Adapter runtime integration.
//!
//! Bridges the synchronous event loop with the async TCP server.

use std::net::SocketAddr;

use anyhow::Context;
use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot, watch};

use crate::protocol::{AckMessage, ErrorMessage, ObservationMessage, MAX_COMMAND_MOVES};
use crate::server::{run_server, ServerConfig};
use crate::types::InputCommand;

/// Command delivered to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    pub client_id: u64,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A client asked for the current state (sent after a streaming hello).
    SnapshotRequest,
}

/// Engine commands decoded from one protocol `command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    pub commands: ArrayVec<InputCommand, MAX_COMMAND_MOVES>,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: u64, ack: AckMessage },
    ToClientError { client_id: u64, err: ErrorMessage },
    ToClientObservation { client_id: u64, obs: ObservationMessage },
    /// Sent to every client that asked for streamed observations.
    BroadcastObservation { obs: ObservationMessage },
}

/// Connection summary shown in the HUD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterStatus {
    pub clients: usize,
    pub controller_id: Option<u64>,
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status_rx: watch::Receiver<AdapterStatus>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` when `CUBE_AI_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        let config = ServerConfig::from_env();
        if config.disabled {
            return Ok(None);
        }
        Self::start(config).map(Some)
    }

    /// Bind the listener and start serving on a private runtime.
    ///
    /// Blocks until the socket is bound so bind errors surface here.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (status_tx, status_rx) = watch::channel(AdapterStatus::default());
        let (ready_tx, ready_rx) = oneshot::channel::<SocketAddr>();

        let rt = Runtime::new().context("create tokio runtime")?;
        let server = rt.spawn(async move {
            run_server(config, cmd_tx, out_rx, status_tx, Some(ready_tx)).await
        });

        // The ready sender is dropped without a value only when the server
        // returned before binding.
        let addr = match rt.block_on(ready_rx) {
            Ok(addr) => addr,
            Err(_) => {
                let err = rt
                    .block_on(server)
                    .context("adapter server task panicked")?
                    .err()
                    .unwrap_or_else(|| anyhow::anyhow!("adapter server exited before binding"));
                return Err(err.context("start adapter"));
            }
        };

        Ok(Self {
            _rt: rt,
            addr,
            cmd_rx,
            out_tx,
            status_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn status(&self) -> AdapterStatus {
        *self.status_rx.borrow()
    }
}
