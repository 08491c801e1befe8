//! Subscription gateway
//!
//! A small axum server exposing Progress Registry streams over a single
//! bidirectional WebSocket endpoint at `/subscribe`, for callers that
//! would rather hold a duplex connection than poll the gRPC
//! `SubscribeProgress` stream (browser clients, mainly). One connection
//! may be subscribed to any number of operation ids at once; there is no
//! id in the URL, the client asks for one over the wire.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::entities::progress::{ProgressSnapshot, ProgressState};
use crate::infrastructure::progress::ProgressRegistry;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const MAX_MISSED_PONGS: u32 = 2;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Subscribe { operation_id: String },
    Unsubscribe { operation_id: String },
    Ping,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage {
    Subscribed { operation_id: String },
    Unsubscribed { operation_id: String },
    Progress { operation_id: String, snapshot: ProgressSnapshot },
    Complete { operation_id: String },
    Failed { operation_id: String, error: String },
    Error { message: String },
    Pong,
}

pub struct SubscriptionGateway {
    addr: std::net::SocketAddr,
    registry: Arc<ProgressRegistry>,
}

impl SubscriptionGateway {
    pub fn new(addr: std::net::SocketAddr, registry: Arc<ProgressRegistry>) -> Self {
        Self { addr, registry }
    }

    pub fn router(registry: Arc<ProgressRegistry>) -> Router {
        Router::new()
            .route("/subscribe", get(subscribe))
            .with_state(registry)
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = Self::router(self.registry);
        info!("Starting subscription gateway |\n addr: {}", self.addr);
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}

async fn subscribe(State(registry): State<Arc<ProgressRegistry>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// Turns a registry snapshot into the gateway's `progress`/`complete`/
/// `failed` out-messages: non-terminal states are relayed as `progress`,
/// terminal ones collapse into a single `complete` or `failed` event (a
/// synthetic `NotFound` snapshot reads as `failed`).
fn snapshot_to_message(operation_id: String, snapshot: ProgressSnapshot) -> ServerMessage {
    match snapshot.state {
        ProgressState::Completed => ServerMessage::Complete { operation_id },
        ProgressState::Failed | ProgressState::Cancelled | ProgressState::NotFound => {
            ServerMessage::Failed { operation_id, error: snapshot.message }
        }
        ProgressState::Pending | ProgressState::InProgress => {
            ServerMessage::Progress { operation_id, snapshot }
        }
    }
}

async fn handle_socket(mut socket: WebSocket, registry: Arc<ProgressRegistry>) {
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(32);
    let mut subscriptions: HashMap<String, JoinHandle<()>> = HashMap::new();
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // first tick fires immediately; skip it
    let mut awaiting_pong = false;
    let mut missed_pongs = 0u32;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Subscribe { operation_id }) => {
                                subscriptions.entry(operation_id.clone()).or_insert_with(|| {
                                    spawn_forwarder(registry.clone(), operation_id.clone(), out_tx.clone())
                                });
                                let _ = out_tx.send(ServerMessage::Subscribed { operation_id }).await;
                            }
                            Ok(ClientMessage::Unsubscribe { operation_id }) => {
                                if let Some(handle) = subscriptions.remove(&operation_id) {
                                    handle.abort();
                                }
                                let _ = out_tx.send(ServerMessage::Unsubscribed { operation_id }).await;
                            }
                            Ok(ClientMessage::Ping) => {
                                let _ = out_tx.send(ServerMessage::Pong).await;
                            }
                            Err(e) => {
                                let _ = out_tx.send(ServerMessage::Error { message: e.to_string() }).await;
                            }
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        awaiting_pong = false;
                        missed_pongs = 0;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
            msg = out_rx.recv() => {
                let Some(msg) = msg else { break };
                if let ServerMessage::Complete { operation_id } | ServerMessage::Failed { operation_id, .. } = &msg {
                    subscriptions.remove(operation_id);
                }
                let payload = match serde_json::to_string(&msg) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(error = %e, "failed to serialize gateway message");
                        continue;
                    }
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            _ = heartbeat.tick() => {
                if awaiting_pong {
                    missed_pongs += 1;
                    if missed_pongs >= MAX_MISSED_PONGS {
                        warn!("closing subscription socket after {missed_pongs} missed heartbeat pongs");
                        break;
                    }
                }
                if socket.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
                awaiting_pong = true;
            }
        }
    }

    for (_, handle) in subscriptions.drain() {
        handle.abort();
    }
}

/// Spawns a task that forwards one operation's registry stream into the
/// connection's shared outbound channel until the stream closes (its
/// terminal snapshot was delivered) or the channel is gone.
fn spawn_forwarder(
    registry: Arc<ProgressRegistry>,
    operation_id: String,
    out_tx: mpsc::Sender<ServerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rx = registry.subscribe(&operation_id);
        while let Some(snapshot) = rx.recv().await {
            let msg = snapshot_to_message(operation_id.clone(), snapshot);
            if out_tx.send(msg).await.is_err() {
                break;
            }
        }
    })
}
