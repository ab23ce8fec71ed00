//! Glue between the remote adapter and the app.

use crate::adapter::protocol::{build_observation, create_ack, state_hash};
use crate::adapter::{Adapter, InboundPayload, OutboundMessage};
use crate::app::App;
use crate::core::EngineSnapshot;
use crate::term::AdapterStatusView;

/// Most inbound messages handled per loop iteration.
const MAX_INBOUND_PER_PUMP: usize = 64;

pub struct RemoteBridge {
    adapter: Adapter,
    obs_seq: u64,
    last_hash: Option<u64>,
    snapshot: EngineSnapshot,
}

impl RemoteBridge {
    pub fn new(adapter: Adapter) -> Self {
        Self {
            adapter,
            obs_seq: 0,
            last_hash: None,
            snapshot: EngineSnapshot::default(),
        }
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn status_view(&self) -> AdapterStatusView {
        let status = self.adapter.status();
        AdapterStatusView {
            enabled: true,
            client_count: status.clients,
            controller_id: status.controller_id,
        }
    }

    /// Apply queued remote commands, ack them, then broadcast the state if
    /// it changed.
    pub fn pump(&mut self, app: &mut App, now_ms: u64) {
        for _ in 0..MAX_INBOUND_PER_PUMP {
            let Some(inbound) = self.adapter.try_recv() else {
                break;
            };
            match inbound.payload {
                InboundPayload::Command(cmd) => {
                    let report = app.apply_remote(&cmd, now_ms);
                    tracing::debug!(
                        client_id = inbound.client_id,
                        seq = inbound.seq,
                        applied = report.applied,
                        dropped = report.dropped,
                        "remote command"
                    );
                    self.adapter.send(OutboundMessage::ToClientAck {
                        client_id: inbound.client_id,
                        ack: create_ack(inbound.seq, report.applied, report.dropped),
                    });
                }
                InboundPayload::SnapshotRequest => {
                    app.engine().snapshot_into(&mut self.snapshot);
                    self.obs_seq += 1;
                    self.adapter.send(OutboundMessage::ToClientObservation {
                        client_id: inbound.client_id,
                        obs: build_observation(&self.snapshot, self.obs_seq),
                    });
                }
            }
        }
        self.publish(app);
    }

    /// Broadcast an observation when the cube, mode or step changed.
    pub fn publish(&mut self, app: &App) {
        app.engine().snapshot_into(&mut self.snapshot);
        let hash = state_hash(&self.snapshot);
        if self.last_hash == Some(hash) {
            return;
        }
        self.last_hash = Some(hash);
        self.obs_seq += 1;
        self.adapter.send(OutboundMessage::BroadcastObservation {
            obs: build_observation(&self.snapshot, self.obs_seq),
        });
    }
}
