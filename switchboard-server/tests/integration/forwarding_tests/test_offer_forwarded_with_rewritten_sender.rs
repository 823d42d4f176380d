use switchboard_core::{PeerId, RoomId, SignalMessage};
use switchboard_server::RoomCommand;

use crate::integration::{create_test_registry, init_tracing};

#[tokio::test]
async fn test_offer_forwarded_with_rewritten_sender() {
    init_tracing();

    let (registry, signaling) = create_test_registry();
    let room = RoomId::parse("r1").unwrap();
    let caller = PeerId::new();
    let callee = PeerId::new();

    registry.join(&room, caller.clone()).await;
    registry.join(&room, callee.clone()).await;
    assert!(signaling.wait_for_deliveries(3, 5000).await);

    // The caller claims to be somebody else; the relay must not care.
    registry
        .dispatch(
            &room,
            RoomCommand::Forward {
                from: caller.clone(),
                message: SignalMessage::Offer {
                    sdp: "v=0".into(),
                    sender: PeerId::new(),
                    target: callee.clone(),
                },
            },
        )
        .await;

    assert!(signaling.wait_for_deliveries(4, 5000).await);
    assert!(
        signaling
            .messages_for(&callee)
            .await
            .contains(&SignalMessage::Offer {
                sdp: "v=0".into(),
                sender: caller,
                target: callee.clone(),
            })
    );
}
