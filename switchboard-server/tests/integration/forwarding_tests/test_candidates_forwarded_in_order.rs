use switchboard_core::{IceCandidate, PeerId, RoomId, SignalMessage};
use switchboard_server::RoomCommand;

use crate::integration::{create_test_registry, init_tracing};

fn candidate(n: usize) -> IceCandidate {
    IceCandidate {
        candidate: format!("candidate:{n}"),
        sdp_mid: Some("0".into()),
        sdp_m_line_index: Some(0),
    }
}

#[tokio::test]
async fn test_candidates_forwarded_in_order() {
    init_tracing();

    let (registry, signaling) = create_test_registry();
    let room = RoomId::parse("r1").unwrap();
    let caller = PeerId::new();
    let callee = PeerId::new();

    registry.join(&room, caller.clone()).await;
    registry.join(&room, callee.clone()).await;
    assert!(signaling.wait_for_deliveries(3, 5000).await);

    for n in 0..3 {
        registry
            .dispatch(
                &room,
                RoomCommand::Forward {
                    from: caller.clone(),
                    message: SignalMessage::IceCandidate {
                        candidate: candidate(n),
                        sender: caller.clone(),
                        target: callee.clone(),
                    },
                },
            )
            .await;
    }

    assert!(signaling.wait_for_deliveries(6, 5000).await);

    let received: Vec<IceCandidate> = signaling
        .messages_for(&callee)
        .await
        .into_iter()
        .filter_map(|msg| match msg {
            SignalMessage::IceCandidate { candidate, .. } => Some(candidate),
            _ => None,
        })
        .collect();

    assert_eq!(received, vec![candidate(0), candidate(1), candidate(2)]);
}
