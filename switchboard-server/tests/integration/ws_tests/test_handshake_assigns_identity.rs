use crate::integration::{init_tracing, spawn_relay};
use crate::utils::TestClient;

#[tokio::test]
async fn test_handshake_assigns_identity() {
    init_tracing();

    let addr = spawn_relay().await;

    let first = TestClient::connect(addr)
        .await
        .expect("Failed to connect first client");
    let second = TestClient::connect(addr)
        .await
        .expect("Failed to connect second client");

    // Each connection gets its own identity and the ICE configuration.
    assert_ne!(first.peer_id, second.peer_id);
    assert!(!first.ice_servers.is_empty());

    first.close().await.expect("Failed to close first client");
    second.close().await.expect("Failed to close second client");
}
