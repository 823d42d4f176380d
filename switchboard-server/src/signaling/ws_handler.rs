use crate::app::AppState;
use crate::room::RoomCommand;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use switchboard_core::{PeerId, RoomId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let peer_id = PeerId::new();
    info!("New signaling connection: {}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.service.add_peer(peer_id.clone(), tx);

    // Handshake: the peer learns its identity and the ICE servers to use.
    state.service.send_signal(
        peer_id.clone(),
        SignalMessage::IceConfig {
            ice_servers: state.service.ice_servers(),
        },
    );
    state.service.send_signal(
        peer_id.clone(),
        SignalMessage::Welcome {
            peer_id: peer_id.clone(),
        },
    );

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut current_room: Option<RoomId> = None;

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                Ok(signal) => handle_signal(&state, &peer_id, &mut current_room, signal).await,
                Err(e) => warn!("Invalid SignalMessage from {}: {:?}", peer_id, e),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Socket gone, voluntary or not: the remaining occupant hears PeerLeft.
    if let Some(room) = current_room.take() {
        state
            .rooms
            .dispatch(
                &room,
                RoomCommand::Leave {
                    peer_id: peer_id.clone(),
                },
            )
            .await;
    }

    send_task.abort();
    state.service.remove_peer(&peer_id);
    info!("Signaling connection closed: {}", peer_id);
}

async fn handle_signal(
    state: &AppState,
    peer_id: &PeerId,
    current_room: &mut Option<RoomId>,
    signal: SignalMessage,
) {
    match signal {
        SignalMessage::Join { room } => {
            // One room at a time: an earlier membership ends first.
            if let Some(previous) = current_room.take() {
                if previous != room {
                    state
                        .rooms
                        .dispatch(
                            &previous,
                            RoomCommand::Leave {
                                peer_id: peer_id.clone(),
                            },
                        )
                        .await;
                }
            }

            info!("Peer {} wants to join room '{}'", peer_id, room);
            state.rooms.join(&room, peer_id.clone()).await;
            *current_room = Some(room);
        }

        SignalMessage::Leave => {
            if let Some(room) = current_room.take() {
                state
                    .rooms
                    .dispatch(
                        &room,
                        RoomCommand::Leave {
                            peer_id: peer_id.clone(),
                        },
                    )
                    .await;
            }
        }

        message @ (SignalMessage::Offer { .. }
        | SignalMessage::Answer { .. }
        | SignalMessage::IceCandidate { .. }) => {
            let Some(room) = current_room.as_ref() else {
                warn!("Peer {} sent a negotiation message outside a room", peer_id);
                return;
            };
            state
                .rooms
                .dispatch(
                    room,
                    RoomCommand::Forward {
                        from: peer_id.clone(),
                        message,
                    },
                )
                .await;
        }

        other => warn!("Unexpected message from {}: {:?}", peer_id, other),
    }
}
