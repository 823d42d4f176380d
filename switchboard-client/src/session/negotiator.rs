use crate::link::{LinkConfig, LinkError, LinkEvent, PeerConnector, PeerLink, SdpKind};
use crate::media::{MediaConstraints, MediaError, MediaSource, MediaStream};
use crate::session::policy::{CaptureTiming, NegotiationPolicy, OffererPolicy};
use crate::session::state::{CallState, Role};
use crate::signaling::{SignalingClient, SignalingError};
use std::collections::VecDeque;
use std::sync::Arc;
use switchboard_core::{IceCandidate, PeerId, SignalMessage};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};


#[derive(Debug, Error)]
pub enum NegotiationError {
    /// Negotiation never proceeds to offer/answer without local media; the
    /// remote side expects tracks.
    #[error("local media unavailable: {0}")]
    MediaAccessDenied(#[from] MediaError),

    /// A description arrived with no context to apply it in, e.g. an answer
    /// while no offer is outstanding. Not recoverable in place; recovery is
    /// a fresh negotiator.
    #[error("no negotiation context for the received description")]
    DescriptionMismatch,

    #[error("peer transport failed: {0}")]
    Link(#[from] LinkError),

    #[error("signaling failed: {0}")]
    Signaling(#[from] SignalingError),
}

/// Outbound signaling as seen by the negotiator. [`SignalingClient`] is the
/// production implementation; tests capture messages with a recorder.
pub trait SignalSink: Send + Sync {
    fn send(&self, message: SignalMessage) -> Result<(), SignalingError>;
}

impl SignalSink for SignalingClient {
    fn send(&self, message: SignalMessage) -> Result<(), SignalingError> {
        SignalingClient::send(self, message)
    }
}

/// Per-call negotiation state machine.
///
/// Owns the local media stream, the peer link, and the buffer of remote ICE
/// candidates that arrive before a remote description exists. Driven from a
/// single task: every transition is a response to one inbound signal or one
/// local action, never two at once.
pub struct SessionNegotiator {
    local_peer: PeerId,
    policy: NegotiationPolicy,
    constraints: MediaConstraints,
    link_config: LinkConfig,
    media: Arc<dyn MediaSource>,
    connector: Arc<dyn PeerConnector>,
    sink: Arc<dyn SignalSink>,
    link_events: mpsc::UnboundedSender<LinkEvent>,

    state: CallState,
    remote_peer: Option<PeerId>,
    link: Option<Box<dyn PeerLink>>,
    stream: Option<MediaStream>,
    local_description: Option<(SdpKind, String)>,
    remote_description: Option<(SdpKind, String)>,
    /// Remote candidates held until the remote description is set. Applying
    /// a candidate earlier is an error in the underlying transport.
    pending_candidates: VecDeque<IceCandidate>,
    muted: bool,
}

impl SessionNegotiator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        local_peer: PeerId,
        policy: NegotiationPolicy,
        constraints: MediaConstraints,
        link_config: LinkConfig,
        media: Arc<dyn MediaSource>,
        connector: Arc<dyn PeerConnector>,
        sink: Arc<dyn SignalSink>,
        link_events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Self {
        Self {
            local_peer,
            policy,
            constraints,
            link_config,
            media,
            connector,
            sink,
            link_events,
            state: CallState::Idle,
            remote_peer: None,
            link: None,
            stream: None,
            local_description: None,
            remote_description: None,
            pending_candidates: VecDeque::new(),
            muted: false,
        }
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn remote_peer(&self) -> Option<&PeerId> {
        self.remote_peer.as_ref()
    }

    pub fn local_stream(&self) -> Option<&MediaStream> {
        self.stream.as_ref()
    }

    pub fn local_description(&self) -> Option<&(SdpKind, String)> {
        self.local_description.as_ref()
    }

    pub fn remote_description(&self) -> Option<&(SdpKind, String)> {
        self.remote_description.as_ref()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// The join went out. Captures media right away under
    /// [`CaptureTiming::OnJoin`].
    pub async fn joined(&mut self) -> Result<(), NegotiationError> {
        if !matches!(self.state, CallState::Idle) {
            warn!("joined() in state {:?}, ignoring", self.state);
            return Ok(());
        }

        if self.policy.capture == CaptureTiming::OnJoin {
            self.ensure_media().await?;
        }

        self.state = CallState::AwaitingPeer;
        Ok(())
    }

    /// Feed one inbound relay message through the state machine.
    pub async fn handle_signal(&mut self, message: SignalMessage) -> Result<(), NegotiationError> {
        if self.state.is_terminal() {
            debug!("Ignoring signal after call ended");
            return Ok(());
        }

        match message {
            SignalMessage::PeerList { peers } => self.on_peer_list(peers).await,
            SignalMessage::PeerJoined { peer } => self.on_peer_joined(peer).await,
            SignalMessage::RoomFull { room } => {
                info!("Room '{}' is full, join rejected", room);
                self.release().await;
                self.state = CallState::Idle;
                Ok(())
            }
            SignalMessage::Offer { sdp, sender, .. } => self.on_offer(sdp, sender).await,
            SignalMessage::Answer { sdp, sender, .. } => self.on_answer(sdp, sender).await,
            SignalMessage::IceCandidate { candidate, .. } => {
                self.on_remote_candidate(candidate).await
            }
            SignalMessage::PeerLeft { peer } => {
                info!("Peer {} left", peer);
                self.end().await;
                Ok(())
            }
            other => {
                debug!("Ignoring non-negotiation signal: {:?}", other);
                Ok(())
            }
        }
    }

    /// Signal a locally discovered candidate to the current peer.
    pub fn handle_local_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        let Some(peer) = self.remote_peer.clone() else {
            debug!("Local candidate before a peer is known, dropping");
            return Ok(());
        };

        self.sink.send(SignalMessage::IceCandidate {
            candidate,
            sender: self.local_peer.clone(),
            target: peer,
        })?;
        Ok(())
    }

    /// Tear the call down. Safe to call any number of times, from any state;
    /// resources are released exactly once.
    pub async fn end(&mut self) {
        if self.state.is_terminal() {
            return;
        }

        self.release().await;
        self.state = CallState::Ended;
        info!("Call ended");
    }

    /// Local-only audio toggle; the session is never renegotiated. Muting
    /// disables the captured track.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(stream) = &self.stream {
            stream.set_audio_enabled(!muted);
        }
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.muted;
        self.set_muted(muted);
        muted
    }

    async fn on_peer_list(&mut self, peers: Vec<PeerId>) -> Result<(), NegotiationError> {
        if !matches!(self.state, CallState::AwaitingPeer) {
            warn!("Peer list in state {:?}, ignoring", self.state);
            return Ok(());
        }

        let Some(peer) = peers.into_iter().next() else {
            debug!("Room is empty, waiting for a peer");
            return Ok(());
        };

        self.remote_peer = Some(peer.clone());

        match self.policy.offerer {
            OffererPolicy::Newcomer => self.initiate(peer).await,
            // The occupant offers under this policy; wait for it.
            OffererPolicy::Occupant => Ok(()),
        }
    }

    async fn on_peer_joined(&mut self, peer: PeerId) -> Result<(), NegotiationError> {
        if !matches!(self.state, CallState::AwaitingPeer) {
            warn!("Peer joined in state {:?}, ignoring", self.state);
            return Ok(());
        }

        self.remote_peer = Some(peer.clone());

        match self.policy.offerer {
            // The newcomer offers under this policy; wait for it.
            OffererPolicy::Newcomer => Ok(()),
            OffererPolicy::Occupant => self.initiate(peer).await,
        }
    }

    async fn initiate(&mut self, peer: PeerId) -> Result<(), NegotiationError> {
        self.ensure_media().await?;
        self.ensure_link().await?;

        let sdp = {
            let Some(link) = self.link.as_mut() else {
                return Err(NegotiationError::DescriptionMismatch);
            };
            let sdp = link.create_offer().await?;
            link.set_local_description(SdpKind::Offer, &sdp).await?;
            sdp
        };

        self.local_description = Some((SdpKind::Offer, sdp.clone()));
        self.sink.send(SignalMessage::Offer {
            sdp,
            sender: self.local_peer.clone(),
            target: peer.clone(),
        })?;

        self.state = CallState::Negotiating(Role::Initiator);
        info!("Sent offer to {}", peer);
        Ok(())
    }

    async fn on_offer(&mut self, sdp: String, sender: PeerId) -> Result<(), NegotiationError> {
        if !matches!(self.state, CallState::AwaitingPeer) {
            warn!("Offer in state {:?}, ignoring", self.state);
            return Ok(());
        }

        self.remote_peer = Some(sender.clone());
        self.ensure_media().await?;
        // The link must exist before the remote offer is applied.
        self.ensure_link().await?;

        {
            let Some(link) = self.link.as_mut() else {
                return Err(NegotiationError::DescriptionMismatch);
            };
            link.set_remote_description(SdpKind::Offer, &sdp).await?;
        }
        self.remote_description = Some((SdpKind::Offer, sdp));
        self.state = CallState::Negotiating(Role::Responder);

        self.flush_pending_candidates().await?;

        let answer = {
            let Some(link) = self.link.as_mut() else {
                return Err(NegotiationError::DescriptionMismatch);
            };
            let answer = link.create_answer().await?;
            link.set_local_description(SdpKind::Answer, &answer).await?;
            answer
        };

        self.local_description = Some((SdpKind::Answer, answer.clone()));
        self.sink.send(SignalMessage::Answer {
            sdp: answer,
            sender: self.local_peer.clone(),
            target: sender.clone(),
        })?;

        // Nothing further is awaited on the responder side.
        self.state = CallState::Connected;
        info!("Answered offer from {}, call connected", sender);
        Ok(())
    }

    async fn on_answer(&mut self, sdp: String, sender: PeerId) -> Result<(), NegotiationError> {
        if !matches!(self.state, CallState::Negotiating(Role::Initiator)) {
            return Err(NegotiationError::DescriptionMismatch);
        }

        if self.remote_peer.as_ref() != Some(&sender) {
            warn!("Answer from unexpected sender {}, ignoring", sender);
            return Ok(());
        }

        {
            let Some(link) = self.link.as_mut() else {
                return Err(NegotiationError::DescriptionMismatch);
            };
            link.set_remote_description(SdpKind::Answer, &sdp).await?;
        }
        self.remote_description = Some((SdpKind::Answer, sdp));

        self.flush_pending_candidates().await?;

        self.state = CallState::Connected;
        info!("Received answer from {}, call connected", sender);
        Ok(())
    }

    async fn on_remote_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<(), NegotiationError> {
        if self.remote_description.is_some() {
            if let Some(link) = self.link.as_mut() {
                link.add_ice_candidate(&candidate).await?;
                return Ok(());
            }
        }

        // No remote description yet: hold the candidate, in arrival order.
        self.pending_candidates.push_back(candidate);
        Ok(())
    }

    async fn flush_pending_candidates(&mut self) -> Result<(), NegotiationError> {
        if self.pending_candidates.is_empty() {
            return Ok(());
        }

        debug!(
            "Applying {} buffered remote candidates",
            self.pending_candidates.len()
        );

        let Some(link) = self.link.as_mut() else {
            return Ok(());
        };
        while let Some(candidate) = self.pending_candidates.pop_front() {
            link.add_ice_candidate(&candidate).await?;
        }
        Ok(())
    }

    async fn ensure_media(&mut self) -> Result<(), NegotiationError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = self.media.capture(self.constraints).await?;
        stream.set_audio_enabled(!self.muted);
        self.stream = Some(stream);
        Ok(())
    }

    async fn ensure_link(&mut self) -> Result<(), NegotiationError> {
        if self.link.is_some() {
            return Ok(());
        }

        let mut link = self
            .connector
            .connect(&self.link_config, self.link_events.clone())
            .await?;

        if let Some(stream) = &self.stream {
            for track in stream.tracks() {
                link.add_track(track).await?;
            }
        }

        self.link = Some(link);
        Ok(())
    }

    async fn release(&mut self) {
        if let Some(mut link) = self.link.take() {
            if let Err(e) = link.close().await {
                warn!("Error closing peer link: {}", e);
            }
        }
        if let Some(stream) = self.stream.take() {
            stream.stop();
        }
        self.local_description = None;
        self.remote_description = None;
        self.pending_candidates.clear();
        self.remote_peer = None;
    }
}
