use switchboard_core::{PeerId, RoomId, SignalMessage};
use switchboard_server::RoomCommand;

use crate::integration::{create_test_registry, init_tracing};

#[tokio::test]
async fn test_capacity_frees_up_after_leave() {
    init_tracing();

    let (registry, signaling) = create_test_registry();
    let room = RoomId::parse("r1").unwrap();
    let first = PeerId::new();
    let second = PeerId::new();
    let third = PeerId::new();

    registry.join(&room, first.clone()).await;
    registry.join(&room, second.clone()).await;
    assert!(signaling.wait_for_deliveries(3, 5000).await);

    registry
        .dispatch(
            &room,
            RoomCommand::Leave {
                peer_id: second.clone(),
            },
        )
        .await;

    registry.join(&room, third.clone()).await;

    assert!(signaling.wait_for_deliveries(6, 5000).await);
    assert_eq!(
        signaling.messages_for(&third).await,
        vec![SignalMessage::PeerList {
            peers: vec![first.clone()],
        }]
    );
}
