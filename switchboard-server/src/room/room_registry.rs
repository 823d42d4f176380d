use crate::room::room::Room;
use crate::room::room_command::RoomCommand;
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use std::sync::Arc;
use switchboard_core::{PeerId, RoomId};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Lazily creates room tasks and routes commands to them. Rooms remove
/// themselves from the registry once their last occupant leaves.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    signaling: Arc<dyn SignalingOutput>,
}

impl RoomRegistry {
    pub fn new(signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            signaling,
        }
    }

    /// Put a peer into a room, creating the room on first join. Retries if
    /// the room task shut down between lookup and send.
    pub async fn join(&self, room_id: &RoomId, peer_id: PeerId) {
        let mut cmd = RoomCommand::Join { peer_id };
        loop {
            let tx = self.sender_for(room_id);
            match tx.send(cmd).await {
                Ok(()) => return,
                Err(mpsc::error::SendError(returned)) => {
                    self.rooms
                        .remove_if(room_id, |_, current| current.same_channel(&tx));
                    cmd = returned;
                }
            }
        }
    }

    /// Route a command to an existing room. Commands for unknown rooms are
    /// dropped; only `join` brings rooms into existence.
    pub async fn dispatch(&self, room_id: &RoomId, cmd: RoomCommand) {
        let Some(tx) = self.rooms.get(room_id).map(|entry| entry.value().clone()) else {
            warn!("Dropping command for unknown room '{}'", room_id);
            return;
        };

        if tx.send(cmd).await.is_err() {
            warn!("Room '{}' task is gone, command dropped", room_id);
        }
    }

    /// Whether a room currently has a running task.
    pub fn is_active(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub(crate) fn deregister(&self, room_id: &RoomId, tx: &mpsc::Sender<RoomCommand>) {
        self.rooms
            .remove_if(room_id, |_, current| current.same_channel(tx));
    }

    fn sender_for(&self, room_id: &RoomId) -> mpsc::Sender<RoomCommand> {
        self.rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                info!("Creating room '{}'", room_id);
                let (tx, rx) = mpsc::channel(64);
                let room = Room::new(
                    room_id.clone(),
                    rx,
                    tx.clone(),
                    self.signaling.clone(),
                    self.clone(),
                );
                tokio::spawn(room.run());
                tx
            })
            .clone()
    }
}
