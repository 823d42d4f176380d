use crate::signaling::subscription::Subscription;
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use switchboard_core::{IceServerConfig, InvalidRoomId, PeerId, RoomId, SignalMessage};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error(transparent)]
    InvalidRoomId(#[from] InvalidRoomId),

    #[error("failed to reach the relay: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("relay closed the connection during the handshake")]
    HandshakeClosed,

    #[error("relay connection closed")]
    ConnectionClosed,

    #[error("signal codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

struct ClientInner {
    peer_id: PeerId,
    ice_servers: Vec<IceServerConfig>,
    out_tx: mpsc::UnboundedSender<WsMessage>,
    subscribers: Arc<DashMap<u64, mpsc::UnboundedSender<SignalMessage>>>,
    next_subscriber: AtomicU64,
}

/// One persistent relay connection for the life of the process. Holds the
/// identity the relay assigned and fans inbound messages out to every live
/// [`Subscription`].
///
/// There is no reconnect: when the connection drops, every subscription
/// closes and the current call is over.
#[derive(Clone)]
pub struct SignalingClient {
    inner: Arc<ClientInner>,
}

impl SignalingClient {
    /// Connect and complete the `IceConfig`/`Welcome` handshake, so the
    /// relay-assigned peer id is available from the moment this returns.
    pub async fn connect(url: &str) -> Result<Self, SignalingError> {
        info!("Connecting to relay at {}", url);

        let (ws, _) = connect_async(url).await?;
        let (mut write, mut read) = ws.split();

        let mut ice_servers = Vec::new();
        let peer_id = loop {
            let msg = match read.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => return Err(SignalingError::Connect(e)),
                None => return Err(SignalingError::HandshakeClosed),
            };

            match msg {
                WsMessage::Text(text) => match serde_json::from_str::<SignalMessage>(&text)? {
                    SignalMessage::IceConfig {
                        ice_servers: servers,
                    } => ice_servers = servers,
                    SignalMessage::Welcome { peer_id } => break peer_id,
                    other => debug!("Ignoring pre-welcome message: {:?}", other),
                },
                WsMessage::Close(_) => return Err(SignalingError::HandshakeClosed),
                _ => {}
            }
        };

        info!("Relay assigned peer id {}", peer_id);

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<WsMessage>();
        let subscribers: Arc<DashMap<u64, mpsc::UnboundedSender<SignalMessage>>> =
            Arc::new(DashMap::new());

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if write.send(msg).await.is_err() {
                    break;
                }
            }
            debug!("Relay sender task finished");
        });

        let fanout = subscribers.clone();
        tokio::spawn(async move {
            while let Some(result) = read.next().await {
                let message = match result {
                    Ok(WsMessage::Text(text)) => {
                        match serde_json::from_str::<SignalMessage>(&text) {
                            Ok(message) => message,
                            Err(e) => {
                                warn!("Invalid SignalMessage from relay: {:?}", e);
                                continue;
                            }
                        }
                    }
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        error!("Relay connection error: {}", e);
                        break;
                    }
                };

                let mut dead = Vec::new();
                for entry in fanout.iter() {
                    if entry.value().send(message.clone()).is_err() {
                        dead.push(*entry.key());
                    }
                }
                for id in dead {
                    fanout.remove(&id);
                }
            }

            // A dropped relay connection invalidates the call. Closing every
            // subscription is how callers hear about it.
            fanout.clear();
            debug!("Relay receiver task finished");
        });

        Ok(Self {
            inner: Arc::new(ClientInner {
                peer_id,
                ice_servers,
                out_tx,
                subscribers,
                next_subscriber: AtomicU64::new(0),
            }),
        })
    }

    pub fn peer_id(&self) -> PeerId {
        self.inner.peer_id.clone()
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.inner.ice_servers
    }

    /// Validates the room id locally; nothing goes over the wire for blank
    /// input.
    pub fn join(&self, room: &str) -> Result<RoomId, SignalingError> {
        let room = RoomId::parse(room)?;
        self.send(SignalMessage::Join { room: room.clone() })?;
        Ok(room)
    }

    pub fn send(&self, message: SignalMessage) -> Result<(), SignalingError> {
        let json = serde_json::to_string(&message)?;
        self.inner
            .out_tx
            .send(WsMessage::Text(json))
            .map_err(|_| SignalingError::ConnectionClosed)
    }

    pub fn leave(&self) -> Result<(), SignalingError> {
        self.send(SignalMessage::Leave)
    }

    /// Register for inbound messages, delivered in arrival order. Dropping
    /// the subscription unregisters it.
    pub fn subscribe(&self) -> Subscription {
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.subscribers.insert(id, tx);
        Subscription::new(id, rx, self.inner.subscribers.clone())
    }

    /// Ask the relay to close the connection. Idempotent.
    pub fn close(&self) {
        let _ = self.inner.out_tx.send(WsMessage::Close(None));
    }
}
