use crate::link::peer_link::{LinkConfig, LinkError, LinkEvent, PeerConnector, PeerLink, SdpKind};
use crate::media::{MediaTrack, TrackKind};
use async_trait::async_trait;
use std::sync::Arc;
use switchboard_core::IceCandidate;
use tokio::sync::mpsc;
use tracing::info;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

fn backend<E: std::fmt::Display>(e: E) -> LinkError {
    LinkError::Backend(e.to_string())
}

/// Builds [`WebRtcLink`]s over the `webrtc` crate.
pub struct WebRtcConnector;

#[async_trait]
impl PeerConnector for WebRtcConnector {
    async fn connect(
        &self,
        config: &LinkConfig,
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Result<Box<dyn PeerLink>, LinkError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs().map_err(backend)?;

        let registry =
            register_default_interceptors(Registry::new(), &mut media_engine).map_err(backend)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .map_err(backend)?,
        );

        // Trickle ICE: every locally discovered candidate goes straight to
        // the call loop for signaling.
        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx.send(LinkEvent::CandidateGenerated(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                }));
            })
        }));

        let track_tx = events.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();

            Box::pin(async move {
                info!("Remote track arrived: {}", track.id());
                let kind = match track.kind() {
                    webrtc::rtp_transceiver::rtp_codec::RTPCodecType::Audio => TrackKind::Audio,
                    _ => TrackKind::Video,
                };
                let _ = tx.send(LinkEvent::TrackReceived {
                    id: track.id(),
                    kind,
                });
            })
        }));

        let state_tx = events;
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {:?}", s);
                    match s {
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(LinkEvent::Disconnected);
                        }
                        _ => {}
                    }
                })
            },
        ));

        Ok(Box::new(WebRtcLink { peer_connection }))
    }
}

/// [`PeerLink`] backed by a real `RTCPeerConnection`.
pub struct WebRtcLink {
    peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcLink {
    fn description(kind: SdpKind, sdp: &str) -> Result<RTCSessionDescription, LinkError> {
        match kind {
            SdpKind::Offer => RTCSessionDescription::offer(sdp.to_owned()).map_err(backend),
            SdpKind::Answer => RTCSessionDescription::answer(sdp.to_owned()).map_err(backend),
        }
    }
}

#[async_trait]
impl PeerLink for WebRtcLink {
    async fn create_offer(&mut self) -> Result<String, LinkError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(backend)?;
        Ok(offer.sdp)
    }

    async fn create_answer(&mut self) -> Result<String, LinkError> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .map_err(backend)?;
        Ok(answer.sdp)
    }

    async fn set_local_description(&mut self, kind: SdpKind, sdp: &str) -> Result<(), LinkError> {
        let desc = Self::description(kind, sdp)?;
        self.peer_connection
            .set_local_description(desc)
            .await
            .map_err(backend)
    }

    async fn set_remote_description(&mut self, kind: SdpKind, sdp: &str) -> Result<(), LinkError> {
        let desc = Self::description(kind, sdp)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(backend)
    }

    async fn add_track(&mut self, track: &MediaTrack) -> Result<(), LinkError> {
        let capability = match track.kind() {
            TrackKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                ..Default::default()
            },
            TrackKind::Video => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                ..Default::default()
            },
        };

        let local = Arc::new(TrackLocalStaticSample::new(
            capability,
            track.id().to_owned(),
            "switchboard".to_owned(),
        ));

        self.peer_connection
            .add_track(local as Arc<dyn TrackLocal + Send + Sync>)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn add_ice_candidate(&mut self, candidate: &IceCandidate) -> Result<(), LinkError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate.clone(),
            sdp_mid: candidate.sdp_mid.clone(),
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(backend)
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        self.peer_connection.close().await.map_err(backend)
    }
}
