pub mod forwarding_tests;
pub mod ws_tests;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Level;

use switchboard_server::{AppState, RoomRegistry, router};

use crate::utils::MockSignalingOutput;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Registry wired to a capturing mock instead of real sockets.
pub fn create_test_registry() -> (RoomRegistry, MockSignalingOutput) {
    let signaling = MockSignalingOutput::new();
    let registry = RoomRegistry::new(Arc::new(signaling.clone()));
    (registry, signaling)
}

/// Spawn a full relay on an ephemeral port and return its address.
pub async fn spawn_relay() -> SocketAddr {
    let app = router(AppState::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Relay failed");
    });

    addr
}
