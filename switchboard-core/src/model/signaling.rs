use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    /// Public STUN endpoint used when no deployment-specific servers are
    /// configured.
    pub fn default_stun() -> Self {
        Self {
            urls: vec!["stun:stun.l.google.com:19302".to_owned()],
            username: None,
            credential: None,
        }
    }
}

/// A discovered network path, relayed verbatim between peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
}

/// Everything that crosses the relay connection, in both directions.
///
/// Offer/Answer/IceCandidate always name both `sender` and `target`; the
/// relay rewrites `sender` with the connection identity before forwarding,
/// so a peer can neither spoof its identity nor reach a peer outside its
/// room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum SignalMessage {
    Join {
        room: RoomId,
    },
    Leave,
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Welcome {
        peer_id: PeerId,
    },
    /// Occupants already present, sent to a peer that just joined.
    PeerList {
        peers: Vec<PeerId>,
    },
    /// A new peer arrived, sent to occupants already present.
    PeerJoined {
        peer: PeerId,
    },
    PeerLeft {
        peer: PeerId,
    },
    RoomFull {
        room: RoomId,
    },
    Offer {
        sdp: String,
        sender: PeerId,
        target: PeerId,
    },
    Answer {
        sdp: String,
        sender: PeerId,
        target: PeerId,
    },
    IceCandidate {
        candidate: IceCandidate,
        sender: PeerId,
        target: PeerId,
    },
}
