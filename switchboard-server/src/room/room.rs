use crate::room::room_command::RoomCommand;
use crate::room::room_registry::RoomRegistry;
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use switchboard_core::{PeerId, RoomId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Rooms host exactly one two-party call.
pub const ROOM_CAPACITY: usize = 2;

/// A single room, running as its own task. All membership changes and
/// message forwarding for the room go through its command channel, so no
/// state is ever touched from two places at once.
pub struct Room {
    id: RoomId,
    /// Ordered by arrival, never more than `ROOM_CAPACITY` entries.
    occupants: Vec<PeerId>,
    command_rx: mpsc::Receiver<RoomCommand>,
    /// Our own sender, kept so deregistration can prove its identity.
    command_tx: mpsc::Sender<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
    registry: RoomRegistry,
    /// Set once somebody joined; an occupied room that empties shuts down.
    occupied: bool,
}

impl Room {
    pub(crate) fn new(
        id: RoomId,
        command_rx: mpsc::Receiver<RoomCommand>,
        command_tx: mpsc::Sender<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
        registry: RoomRegistry,
    ) -> Self {
        Self {
            id,
            occupants: Vec::new(),
            command_rx,
            command_tx,
            signaling,
            registry,
            occupied: false,
        }
    }

    pub async fn run(mut self) {
        info!("Room '{}' task started", self.id);

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;

            if self.occupied && self.occupants.is_empty() {
                break;
            }
        }

        self.registry.deregister(&self.id, &self.command_tx);
        info!("Room '{}' task finished", self.id);
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { peer_id } => self.handle_join(peer_id).await,
            RoomCommand::Leave { peer_id } => self.handle_leave(peer_id).await,
            RoomCommand::Forward { from, message } => self.handle_forward(from, message).await,
        }
    }

    async fn handle_join(&mut self, peer_id: PeerId) {
        if self.occupants.contains(&peer_id) {
            warn!("Peer {} joined room '{}' twice, ignoring", peer_id, self.id);
            return;
        }

        if self.occupants.len() >= ROOM_CAPACITY {
            info!("Room '{}' is full, rejecting {}", self.id, peer_id);
            self.signaling
                .deliver(
                    peer_id,
                    SignalMessage::RoomFull {
                        room: self.id.clone(),
                    },
                )
                .await;
            return;
        }

        info!("Peer {} joined room '{}'", peer_id, self.id);

        // The newcomer learns who is already here; everyone already here
        // learns about the newcomer.
        self.signaling
            .deliver(
                peer_id.clone(),
                SignalMessage::PeerList {
                    peers: self.occupants.clone(),
                },
            )
            .await;

        for other in &self.occupants {
            self.signaling
                .deliver(
                    other.clone(),
                    SignalMessage::PeerJoined {
                        peer: peer_id.clone(),
                    },
                )
                .await;
        }

        self.occupants.push(peer_id);
        self.occupied = true;
    }

    async fn handle_leave(&mut self, peer_id: PeerId) {
        let Some(position) = self.occupants.iter().position(|p| p == &peer_id) else {
            return;
        };
        self.occupants.remove(position);

        info!("Peer {} left room '{}'", peer_id, self.id);

        for other in &self.occupants {
            self.signaling
                .deliver(
                    other.clone(),
                    SignalMessage::PeerLeft {
                        peer: peer_id.clone(),
                    },
                )
                .await;
        }
    }

    async fn handle_forward(&mut self, from: PeerId, message: SignalMessage) {
        if !self.occupants.contains(&from) {
            warn!(
                "Dropping message from {} who is not in room '{}'",
                from, self.id
            );
            return;
        }

        // Rewrite the sender with the connection identity so a peer cannot
        // speak for anybody else.
        let (target, rewritten) = match message {
            SignalMessage::Offer { sdp, target, .. } => (
                target.clone(),
                SignalMessage::Offer {
                    sdp,
                    sender: from,
                    target,
                },
            ),
            SignalMessage::Answer { sdp, target, .. } => (
                target.clone(),
                SignalMessage::Answer {
                    sdp,
                    sender: from,
                    target,
                },
            ),
            SignalMessage::IceCandidate {
                candidate, target, ..
            } => (
                target.clone(),
                SignalMessage::IceCandidate {
                    candidate,
                    sender: from,
                    target,
                },
            ),
            other => {
                warn!("Room '{}' cannot forward {:?}", self.id, other);
                return;
            }
        };

        if !self.occupants.contains(&target) {
            warn!(
                "Dropping message for {} who is not in room '{}'",
                target, self.id
            );
            return;
        }

        self.signaling.deliver(target, rewritten).await;
    }
}
