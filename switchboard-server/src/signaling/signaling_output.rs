use async_trait::async_trait;
use switchboard_core::{PeerId, SignalMessage};

/// Outbound half of the relay: how a room hands messages back to connected
/// peers. The WebSocket layer implements this; tests substitute a mock that
/// captures traffic instead.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver a message to a single connected peer.
    async fn deliver(&self, peer_id: PeerId, message: SignalMessage);
}
