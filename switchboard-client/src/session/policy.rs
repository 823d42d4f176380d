/// Which side originates the offer once both peers know about each other.
/// Both peers in a room must be configured the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffererPolicy {
    /// The joining peer that finds an occupant already present initiates.
    #[default]
    Newcomer,

    /// The peer already in the room initiates when a newcomer is announced.
    Occupant,
}

/// When local media is captured relative to role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureTiming {
    /// Capture as soon as the join goes through, before the role is known.
    OnJoin,

    /// Capture lazily, right before the offer or answer is built. Avoids a
    /// wasted capture cycle when the join is rejected or the peer never
    /// shows up.
    #[default]
    OnNegotiate,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NegotiationPolicy {
    pub offerer: OffererPolicy,
    pub capture: CaptureTiming,
}
