use switchboard_core::{PeerId, SignalMessage};

/// Commands flowing into a room task from the WebSocket layer.
#[derive(Debug)]
pub enum RoomCommand {
    /// A peer asks to enter the room.
    Join { peer_id: PeerId },

    /// A peer is gone, voluntarily or because its socket dropped.
    Leave { peer_id: PeerId },

    /// A negotiation message to hand to its target occupant.
    Forward { from: PeerId, message: SignalMessage },
}
