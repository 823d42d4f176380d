use switchboard_core::{PeerId, RoomId, SignalMessage};
use switchboard_server::RoomCommand;

use crate::integration::{create_test_registry, init_tracing};

#[tokio::test]
async fn test_forward_from_outsider_dropped() {
    init_tracing();

    let (registry, signaling) = create_test_registry();
    let room = RoomId::parse("r1").unwrap();
    let occupant = PeerId::new();
    let outsider = PeerId::new();

    registry.join(&room, occupant.clone()).await;
    assert!(signaling.wait_for_deliveries(1, 5000).await);

    registry
        .dispatch(
            &room,
            RoomCommand::Forward {
                from: outsider,
                message: SignalMessage::Offer {
                    sdp: "v=0".into(),
                    sender: PeerId::new(),
                    target: occupant.clone(),
                },
            },
        )
        .await;

    // Nothing beyond the join acknowledgment must arrive.
    assert!(!signaling.wait_for_deliveries(2, 500).await);
    assert_eq!(signaling.messages_for(&occupant).await.len(), 1);
}
