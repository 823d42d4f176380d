use crate::media::{MediaTrack, TrackKind};
use async_trait::async_trait;
use switchboard_core::{IceCandidate, IceServerConfig};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpKind {
    Offer,
    Answer,
}

#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::default_stun()],
        }
    }
}

/// Events the transport pushes back at the call while a link is alive.
#[derive(Debug)]
pub enum LinkEvent {
    /// A locally discovered ICE candidate, ready to signal to the peer.
    CandidateGenerated(IceCandidate),

    /// Remote media arrived.
    TrackReceived { id: String, kind: TrackKind },

    /// The underlying transport reached a terminal state.
    Disconnected,
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("peer transport failure: {0}")]
    Backend(String),
}

/// Builds a fresh transport for one call. The `events` sender stays with the
/// link for its whole life and carries candidates, remote tracks, and
/// disconnects back to the call loop.
#[async_trait]
pub trait PeerConnector: Send + Sync {
    async fn connect(
        &self,
        config: &LinkConfig,
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Result<Box<dyn PeerLink>, LinkError>;
}

/// One direct peer transport. The negotiator is the only caller and drives
/// it strictly in offer/answer order.
#[async_trait]
pub trait PeerLink: Send {
    async fn create_offer(&mut self) -> Result<String, LinkError>;

    async fn create_answer(&mut self) -> Result<String, LinkError>;

    async fn set_local_description(&mut self, kind: SdpKind, sdp: &str) -> Result<(), LinkError>;

    async fn set_remote_description(&mut self, kind: SdpKind, sdp: &str) -> Result<(), LinkError>;

    async fn add_track(&mut self, track: &MediaTrack) -> Result<(), LinkError>;

    async fn add_ice_candidate(&mut self, candidate: &IceCandidate) -> Result<(), LinkError>;

    async fn close(&mut self) -> Result<(), LinkError>;
}
