use switchboard_core::{PeerId, RoomId, SignalMessage};

use crate::integration::{create_test_registry, init_tracing};

#[tokio::test]
async fn test_first_join_gets_empty_peer_list() {
    init_tracing();

    let (registry, signaling) = create_test_registry();
    let room = RoomId::parse("r1").unwrap();
    let peer = PeerId::new();

    registry.join(&room, peer.clone()).await;

    assert!(signaling.wait_for_deliveries(1, 5000).await);
    assert_eq!(
        signaling.messages_for(&peer).await,
        vec![SignalMessage::PeerList { peers: vec![] }]
    );
}
