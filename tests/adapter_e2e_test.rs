//! Remote adapter over real TCP sockets.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};

use cube_tutor::adapter::protocol::{build_observation, create_ack, create_hello};
use cube_tutor::adapter::{
    run_server, AdapterStatus, InboundCommand, InboundPayload, OutboundMessage, ServerConfig,
};
use cube_tutor::core::CubeEngine;
use cube_tutor::types::{Face, InputCommand, Move};

struct Harness {
    addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status_rx: watch::Receiver<AdapterStatus>,
}

async fn start(max_pending: usize) -> Harness {
    let config = ServerConfig {
        port: 0,
        max_pending_commands: max_pending,
        ..ServerConfig::default()
    };
    let (cmd_tx, cmd_rx) = mpsc::channel(max_pending);
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(AdapterStatus::default());
    let (ready_tx, ready_rx) = oneshot::channel();

    tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, status_tx, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    Harness {
        addr,
        cmd_rx,
        out_tx,
        status_rx,
    }
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn hello(&mut self, seq: u64, stream: bool) -> serde_json::Value {
        let hello = serde_json::to_string(&create_hello(seq, "e2e-test", stream)).unwrap();
        self.send(&hello).await;
        let welcome = self.recv().await;
        assert_eq!(welcome["type"], "welcome");
        welcome
    }

    async fn recv(&mut self) -> serde_json::Value {
        let line = tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for a line")
            .unwrap()
            .expect("connection closed");
        serde_json::from_str(&line).unwrap()
    }
}

async fn next_inbound(rx: &mut mpsc::Receiver<InboundCommand>) -> InboundCommand {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no inbound command")
        .expect("command channel closed")
}

#[tokio::test]
async fn test_hello_command_ack_and_observation() {
    let mut h = start(8).await;
    let mut client = Client::connect(h.addr).await;

    let welcome = client.hello(1, true).await;
    assert_eq!(welcome["seq"], 1);
    assert_eq!(welcome["role"], "controller");
    assert_eq!(welcome["protocol_version"], "1.0.0");
    let client_id = welcome["client_id"].as_u64().unwrap();

    // Streaming clients get a snapshot request on hello.
    let inbound = next_inbound(&mut h.cmd_rx).await;
    assert_eq!(inbound.payload, InboundPayload::SnapshotRequest);

    client
        .send(r#"{"type":"command","seq":2,"ts":1,"moves":["R","u'"]}"#)
        .await;
    let inbound = next_inbound(&mut h.cmd_rx).await;
    assert_eq!(inbound.client_id, client_id);
    assert_eq!(inbound.seq, 2);
    let InboundPayload::Command(cmd) = inbound.payload else {
        panic!("expected command");
    };
    assert_eq!(
        cmd.commands.as_slice(),
        &[
            InputCommand::Move(Move::cw(Face::Right)),
            InputCommand::Move(Move::ccw(Face::Top)),
        ]
    );

    // Play the loop's part: apply, ack, broadcast.
    let mut engine = CubeEngine::new();
    engine.apply_notation("R").unwrap();
    engine.apply_notation("U'").unwrap();
    h.out_tx
        .send(OutboundMessage::ToClientAck {
            client_id,
            ack: create_ack(2, 2, 0),
        })
        .unwrap();
    h.out_tx
        .send(OutboundMessage::BroadcastObservation {
            obs: build_observation(&engine.snapshot(), 1),
        })
        .unwrap();

    let ack = client.recv().await;
    assert_eq!(ack["type"], "ack");
    assert_eq!(ack["seq"], 2);
    assert_eq!(ack["applied"], 2);

    let obs = client.recv().await;
    assert_eq!(obs["type"], "observation");
    assert_eq!(obs["moves"], serde_json::json!(["R", "U'"]));
    assert_eq!(obs["is_solved"], false);
}

#[tokio::test]
async fn test_command_before_hello_is_rejected() {
    let h = start(8).await;
    let mut client = Client::connect(h.addr).await;

    client.send(r#"{"type":"command","seq":1,"moves":["F"]}"#).await;
    let err = client.recv().await;
    assert_eq!(err["type"], "error");
    assert_eq!(err["code"], "handshake_required");
    assert_eq!(err["seq"], 1);
}

#[tokio::test]
async fn test_seq_must_increase() {
    let mut h = start(8).await;
    let mut client = Client::connect(h.addr).await;
    client.hello(5, false).await;

    client.send(r#"{"type":"command","seq":5,"action":"undo"}"#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");

    client.send(r#"{"type":"command","seq":6,"action":"undo"}"#).await;
    let inbound = next_inbound(&mut h.cmd_rx).await;
    assert_eq!(inbound.seq, 6);
}

#[tokio::test]
async fn test_bad_commands_get_invalid_command() {
    let h = start(8).await;
    let mut client = Client::connect(h.addr).await;
    client.hello(1, false).await;

    client.send(r#"{"type":"command","seq":2,"moves":["Q"]}"#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 2);

    client.send(r#"{"type":"command","seq":3}"#).await;
    assert_eq!(client.recv().await["code"], "invalid_command");

    client.send(r#"{"type":"dance","seq":4}"#).await;
    assert_eq!(client.recv().await["code"], "invalid_command");

    client.send("not json").await;
    assert_eq!(client.recv().await["code"], "invalid_command");
}

#[tokio::test]
async fn test_protocol_mismatch_closes_connection() {
    let h = start(8).await;
    let mut client = Client::connect(h.addr).await;
    client
        .send(r#"{"type":"hello","seq":1,"client":{"name":"old"},"protocol_version":"9.0.0"}"#)
        .await;
    let err = client.recv().await;
    assert_eq!(err["code"], "protocol_mismatch");

    let next = tokio::time::timeout(Duration::from_secs(2), client.lines.next_line())
        .await
        .expect("connection should close");
    assert!(matches!(next, Ok(None) | Err(_)));
}

#[tokio::test]
async fn test_observer_is_promoted_when_controller_leaves() {
    let mut h = start(8).await;

    let mut first = Client::connect(h.addr).await;
    let w1 = first.hello(1, false).await;
    assert_eq!(w1["role"], "controller");

    let mut second = Client::connect(h.addr).await;
    let w2 = second.hello(1, false).await;
    assert_eq!(w2["role"], "observer");
    assert_eq!(w2["controller_id"], w1["client_id"]);
    let second_id = w2["client_id"].as_u64().unwrap();

    second.send(r#"{"type":"command","seq":2,"moves":["F"]}"#).await;
    assert_eq!(second.recv().await["code"], "not_controller");

    second.send(r#"{"type":"control","seq":3,"action":"claim"}"#).await;
    assert_eq!(second.recv().await["code"], "controller_active");

    drop(first);
    tokio::time::timeout(Duration::from_secs(2), async {
        while h.status_rx.borrow().controller_id != Some(second_id) {
            h.status_rx.changed().await.unwrap();
        }
    })
    .await
    .expect("second client was not promoted");
    assert_eq!(h.status_rx.borrow().clients, 1);

    second.send(r#"{"type":"command","seq":4,"moves":["F"]}"#).await;
    let inbound = next_inbound(&mut h.cmd_rx).await;
    assert_eq!(inbound.client_id, second_id);
}

#[tokio::test]
async fn test_release_and_claim() {
    let h = start(8).await;
    let mut client = Client::connect(h.addr).await;
    client.hello(1, false).await;

    client.send(r#"{"type":"control","seq":2,"action":"release"}"#).await;
    assert_eq!(client.recv().await["type"], "ack");

    client.send(r#"{"type":"command","seq":3,"moves":["F"]}"#).await;
    assert_eq!(client.recv().await["code"], "not_controller");

    client.send(r#"{"type":"control","seq":4,"action":"CLAIM"}"#).await;
    assert_eq!(client.recv().await["type"], "ack");
}

#[tokio::test]
async fn test_full_queue_reports_backpressure() {
    // Nobody drains the command queue here.
    let h = start(1).await;
    let mut client = Client::connect(h.addr).await;
    client.hello(1, false).await;

    client.send(r#"{"type":"command","seq":2,"moves":["F"]}"#).await;
    client.send(r#"{"type":"command","seq":3,"moves":["B"]}"#).await;
    let err = client.recv().await;
    assert_eq!(err["code"], "backpressure");
    assert_eq!(err["seq"], 3);
    drop(h);
}

#[test]
fn test_bind_conflict_is_an_error() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let result = tokio_test::block_on(async move {
        let config = ServerConfig {
            port,
            ..ServerConfig::default()
        };
        let (cmd_tx, _cmd_rx) = mpsc::channel(1);
        let (_out_tx, out_rx) = mpsc::unbounded_channel();
        let (status_tx, _status_rx) = watch::channel(AdapterStatus::default());
        run_server(config, cmd_tx, out_rx, status_tx, None).await
    });
    assert!(result.is_err());
}
