use dashmap::DashMap;
use std::sync::Arc;
use switchboard_core::SignalMessage;
use tokio::sync::mpsc;

/// A registered listener on the relay connection. Unregisters itself on
/// drop, so repeated join/leave cycles can never stack up handlers.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<SignalMessage>,
    subscribers: Arc<DashMap<u64, mpsc::UnboundedSender<SignalMessage>>>,
}

impl Subscription {
    pub(crate) fn new(
        id: u64,
        rx: mpsc::UnboundedReceiver<SignalMessage>,
        subscribers: Arc<DashMap<u64, mpsc::UnboundedSender<SignalMessage>>>,
    ) -> Self {
        Self {
            id,
            rx,
            subscribers,
        }
    }

    /// Next inbound message, in arrival order. Returns `None` once the relay
    /// connection is gone; callers treat that like the peer leaving.
    pub async fn recv(&mut self) -> Option<SignalMessage> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscribers.remove(&self.id);
    }
}
