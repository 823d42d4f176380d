use switchboard_core::{PeerId, RoomId, SignalMessage};
use switchboard_server::RoomCommand;

use crate::integration::{create_test_registry, init_tracing};

#[tokio::test]
async fn test_leave_notifies_remaining_peer() {
    init_tracing();

    let (registry, signaling) = create_test_registry();
    let room = RoomId::parse("r1").unwrap();
    let first = PeerId::new();
    let second = PeerId::new();

    registry.join(&room, first.clone()).await;
    registry.join(&room, second.clone()).await;
    assert!(signaling.wait_for_deliveries(3, 5000).await);

    registry
        .dispatch(
            &room,
            RoomCommand::Leave {
                peer_id: first.clone(),
            },
        )
        .await;

    assert!(signaling.wait_for_deliveries(4, 5000).await);
    assert!(
        signaling
            .messages_for(&second)
            .await
            .contains(&SignalMessage::PeerLeft { peer: first })
    );
}
