use switchboard_core::{PeerId, RoomId};
use switchboard_server::RoomCommand;

use crate::integration::{create_test_registry, init_tracing};

#[tokio::test]
async fn test_room_deregisters_when_empty() {
    init_tracing();

    let (registry, signaling) = create_test_registry();
    let room = RoomId::parse("r1").unwrap();
    let peer = PeerId::new();

    registry.join(&room, peer.clone()).await;
    assert!(signaling.wait_for_deliveries(1, 5000).await);
    assert!(registry.is_active(&room));

    registry
        .dispatch(&room, RoomCommand::Leave { peer_id: peer })
        .await;

    // The room task shuts itself down once the last occupant is gone.
    let start = std::time::Instant::now();
    while registry.is_active(&room) {
        assert!(
            start.elapsed() < std::time::Duration::from_secs(5),
            "room should deregister itself"
        );
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}
