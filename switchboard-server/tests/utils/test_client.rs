use anyhow::{Context, Result};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use switchboard_core::{IceServerConfig, PeerId, RoomId, SignalMessage};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Timeout for a single inbound signal (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Bare WebSocket peer for driving the relay end to end.
pub struct TestClient {
    /// Identity the relay assigned during the handshake.
    pub peer_id: PeerId,
    /// ICE servers announced during the handshake.
    pub ice_servers: Vec<IceServerConfig>,
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
}

impl TestClient {
    /// Connect and complete the IceConfig/Welcome handshake.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (ws, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .context("Failed to connect to relay")?;
        let (write, mut read) = ws.split();

        let mut ice_servers = Vec::new();
        let peer_id = loop {
            let msg = tokio::time::timeout(
                std::time::Duration::from_millis(SIGNAL_TIMEOUT_MS),
                read.next(),
            )
            .await
            .context("Timeout during handshake")?
            .context("Connection closed during handshake")?
            .context("WebSocket error during handshake")?;

            match msg {
                Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text)? {
                    SignalMessage::IceConfig {
                        ice_servers: servers,
                    } => ice_servers = servers,
                    SignalMessage::Welcome { peer_id } => break peer_id,
                    other => anyhow::bail!("Unexpected handshake message: {other:?}"),
                },
                other => anyhow::bail!("Unexpected handshake frame: {other:?}"),
            }
        };

        Ok(Self {
            peer_id,
            ice_servers,
            write,
            read,
        })
    }

    pub async fn send(&mut self, message: &SignalMessage) -> Result<()> {
        let json = serde_json::to_string(message)?;
        self.write
            .send(Message::Text(json))
            .await
            .context("Failed to send signal")?;
        Ok(())
    }

    pub async fn join(&mut self, room: &str) -> Result<()> {
        let room = RoomId::parse(room)?;
        self.send(&SignalMessage::Join { room }).await
    }

    /// Next signal from the relay, skipping non-text frames.
    pub async fn recv(&mut self) -> Result<SignalMessage> {
        let deadline = std::time::Duration::from_millis(SIGNAL_TIMEOUT_MS);
        loop {
            let msg = tokio::time::timeout(deadline, self.read.next())
                .await
                .context("Timeout waiting for signal")?
                .context("Connection closed")?
                .context("WebSocket error")?;

            match msg {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(_) => anyhow::bail!("Relay closed the connection"),
                _ => continue,
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.write
            .send(Message::Close(None))
            .await
            .context("Failed to close")?;
        Ok(())
    }
}
