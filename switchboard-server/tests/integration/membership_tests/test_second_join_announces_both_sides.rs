use switchboard_core::{PeerId, RoomId, SignalMessage};

use crate::integration::{create_test_registry, init_tracing};

#[tokio::test]
async fn test_second_join_announces_both_sides() {
    init_tracing();

    let (registry, signaling) = create_test_registry();
    let room = RoomId::parse("r1").unwrap();
    let first = PeerId::new();
    let second = PeerId::new();

    registry.join(&room, first.clone()).await;
    registry.join(&room, second.clone()).await;

    assert!(signaling.wait_for_deliveries(3, 5000).await);

    // The newcomer hears who is already present.
    assert_eq!(
        signaling.messages_for(&second).await,
        vec![SignalMessage::PeerList {
            peers: vec![first.clone()],
        }]
    );

    // The occupant hears about the newcomer.
    let first_messages = signaling.messages_for(&first).await;
    assert!(first_messages.contains(&SignalMessage::PeerJoined {
        peer: second.clone(),
    }));
}
