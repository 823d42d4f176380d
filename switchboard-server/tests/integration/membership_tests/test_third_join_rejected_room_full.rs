use switchboard_core::{PeerId, RoomId, SignalMessage};

use crate::integration::{create_test_registry, init_tracing};

#[tokio::test]
async fn test_third_join_rejected_room_full() {
    init_tracing();

    let (registry, signaling) = create_test_registry();
    let room = RoomId::parse("r1").unwrap();
    let first = PeerId::new();
    let second = PeerId::new();
    let third = PeerId::new();

    registry.join(&room, first.clone()).await;
    registry.join(&room, second.clone()).await;
    registry.join(&room, third.clone()).await;

    assert!(signaling.wait_for_deliveries(4, 5000).await);

    assert_eq!(
        signaling.messages_for(&third).await,
        vec![SignalMessage::RoomFull { room }]
    );

    // The occupants never hear about the rejected peer.
    for occupant in [&first, &second] {
        assert!(
            !signaling
                .messages_for(occupant)
                .await
                .contains(&SignalMessage::PeerJoined {
                    peer: third.clone(),
                })
        );
    }
}
