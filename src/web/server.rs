//! WebSocket server broadcasting raid events to browsers.

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;

use crate::raid::{RaidEvent, RaidService};

/// An attack submitted by a connected client.
#[derive(Debug, Deserialize)]
struct AttackCommand {
    user_id: String,
    damage: u64,
}

/// Bridges `RaidService` notifications onto a broadcast channel that each
/// WebSocket connection subscribes to. Events cross as JSON text frames.
pub struct RaidChannel {
    tx: broadcast::Sender<String>,
}

impl RaidChannel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(100);
        Self { tx }
    }

    /// Registers this channel as a raid subscriber. Send errors mean no
    /// client is connected and are ignored.
    pub fn attach(&self, service: &RaidService) {
        let tx = self.tx.clone();
        service.subscribe(Box::new(move |event: &RaidEvent| {
            if let Ok(json) = serde_json::to_string(event) {
                let _ = tx.send(json);
            }
        }));
    }

    pub fn sender(&self) -> broadcast::Sender<String> {
        self.tx.clone()
    }
}

impl Default for RaidChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the raid server on the given port
pub async fn start_raid_server(
    port: u16,
    service: Arc<RaidService>,
    channel: Arc<RaidChannel>,
) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    log::info!("Raid server listening on ws://localhost:{}", port);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let service = Arc::clone(&service);
                let channel = Arc::clone(&channel);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, service, channel).await {
                        log::warn!("Connection error from {}: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                log::warn!("Accept error: {}", e);
            }
        }
    }
}

/// Handle a single WebSocket connection
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    service: Arc<RaidService>,
    channel: Arc<RaidChannel>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    log::info!("WebSocket connection from: {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let mut event_rx = channel.sender().subscribe();

    // Push raid events to this client
    let send_task = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }
    });

    // Incoming frames are attack commands
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<AttackCommand>(&text) {
                Ok(command) => {
                    let now = chrono::Utc::now().timestamp();
                    service.attack(&command.user_id, command.damage, now);
                }
                Err(e) => {
                    log::debug!("Ignoring malformed attack from {}: {}", addr, e);
                }
            },
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    send_task.abort();
    log::info!("WebSocket disconnected: {}", addr);

    Ok(())
}
