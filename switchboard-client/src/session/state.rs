/// Which side of the offer/answer exchange this peer plays. Decided by
/// whichever peer learns of the other first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Initiator,
    Responder,
}

/// Lifecycle of one call.
///
/// `Ended` is terminal: a new call takes a fresh negotiator. `Idle` is
/// reached again only when the relay rejects the join (room full), in which
/// case the caller may retry with a different room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    AwaitingPeer,
    Negotiating(Role),
    Connected,
    Ended,
}

impl CallState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Ended)
    }
}
