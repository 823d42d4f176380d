use switchboard_core::SignalMessage;

use crate::integration::{init_tracing, spawn_relay};
use crate::utils::TestClient;

/// A dropped socket counts as leaving: the survivor hears PeerLeft without
/// any explicit Leave message.
#[tokio::test]
async fn test_disconnect_triggers_peer_left() {
    init_tracing();

    let addr = spawn_relay().await;

    let mut alice = TestClient::connect(addr).await.expect("alice connect");
    let mut bob = TestClient::connect(addr).await.expect("bob connect");

    alice.join("r1").await.expect("alice join");
    alice.recv().await.expect("alice peer list");

    bob.join("r1").await.expect("bob join");
    bob.recv().await.expect("bob peer list");
    alice.recv().await.expect("alice peer joined");

    let bob_id = bob.peer_id.clone();
    bob.close().await.expect("bob close");

    let msg = alice.recv().await.expect("alice peer left");
    assert_eq!(msg, SignalMessage::PeerLeft { peer: bob_id });

    alice.close().await.expect("alice close");
}
