use crate::link::{LinkConfig, LinkEvent, PeerConnector};
use crate::media::{MediaConstraints, MediaSource, TrackKind};
use crate::session::negotiator::SessionNegotiator;
use crate::session::policy::NegotiationPolicy;
use crate::session::state::CallState;
use crate::signaling::{SignalingClient, SignalingError, Subscription};
use std::sync::Arc;
use switchboard_core::{PeerId, SignalMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug)]
pub enum CallCommand {
    HangUp,
    SetMuted(bool),
}

/// What the application sees of a running call.
#[derive(Debug)]
pub enum CallEvent {
    PeerJoined(PeerId),
    Connected,
    TrackReceived { id: String, kind: TrackKind },
    /// The join was rejected; retrying with another room is fine.
    RoomFull,
    Ended(EndReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    HungUp,
    PeerLeft,
    ConnectionLost,
    NegotiationFailed,
}

/// One call: a subscription on the relay, a negotiator, and the task that
/// multiplexes them. Owns the whole thing; dropping the session aborts the
/// task and (via the subscription) unregisters from the client.
pub struct CallSession {
    commands: mpsc::UnboundedSender<CallCommand>,
    events: mpsc::UnboundedReceiver<CallEvent>,
    task: JoinHandle<()>,
}

impl CallSession {
    /// Validate the room id and send the join. Fails without any network
    /// traffic on blank input.
    pub fn start(
        client: &SignalingClient,
        room: &str,
        media: Arc<dyn MediaSource>,
        connector: Arc<dyn PeerConnector>,
        policy: NegotiationPolicy,
        constraints: MediaConstraints,
    ) -> Result<Self, SignalingError> {
        // Subscribe before joining so nothing the relay says is missed.
        let subscription = client.subscribe();
        client.join(room)?;

        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let negotiator = SessionNegotiator::new(
            client.peer_id(),
            policy,
            constraints,
            LinkConfig {
                ice_servers: client.ice_servers().to_vec(),
            },
            media,
            connector,
            Arc::new(client.clone()),
            link_tx,
        );

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_call(
            negotiator,
            subscription,
            link_rx,
            command_rx,
            event_tx,
            client.clone(),
        ));

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            task,
        })
    }

    /// Next call event; `None` after `Ended` has been delivered and the
    /// task is gone.
    pub async fn next_event(&mut self) -> Option<CallEvent> {
        self.events.recv().await
    }

    pub fn hang_up(&self) {
        let _ = self.commands.send(CallCommand::HangUp);
    }

    pub fn set_muted(&self, muted: bool) {
        let _ = self.commands.send(CallCommand::SetMuted(muted));
    }
}

impl Drop for CallSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_call(
    mut negotiator: SessionNegotiator,
    mut signals: Subscription,
    mut link_rx: mpsc::UnboundedReceiver<LinkEvent>,
    mut command_rx: mpsc::UnboundedReceiver<CallCommand>,
    events: mpsc::UnboundedSender<CallEvent>,
    client: SignalingClient,
) {
    if let Err(e) = negotiator.joined().await {
        error!("Failed to start call: {}", e);
        negotiator.end().await;
        let _ = events.send(CallEvent::Ended(EndReason::NegotiationFailed));
        return;
    }

    loop {
        tokio::select! {
            signal = signals.recv() => match signal {
                Some(message) => {
                    match &message {
                        SignalMessage::PeerJoined { peer } => {
                            let _ = events.send(CallEvent::PeerJoined(peer.clone()));
                        }
                        SignalMessage::PeerList { peers } if !peers.is_empty() => {
                            let _ = events.send(CallEvent::PeerJoined(peers[0].clone()));
                        }
                        SignalMessage::RoomFull { .. } => {
                            let _ = events.send(CallEvent::RoomFull);
                        }
                        _ => {}
                    }

                    let before = negotiator.state();
                    if let Err(e) = negotiator.handle_signal(message).await {
                        error!("Negotiation failed: {}", e);
                        negotiator.end().await;
                        let _ = events.send(CallEvent::Ended(EndReason::NegotiationFailed));
                        break;
                    }
                    let after = negotiator.state();

                    if before != after {
                        match after {
                            CallState::Connected => {
                                let _ = events.send(CallEvent::Connected);
                            }
                            CallState::Ended => {
                                let _ = events.send(CallEvent::Ended(EndReason::PeerLeft));
                                break;
                            }
                            // Back to Idle: the join was rejected. The
                            // RoomFull event already went out above.
                            CallState::Idle => break,
                            _ => {}
                        }
                    }
                }
                None => {
                    // The relay connection is gone; the call is over exactly
                    // as if the peer had left.
                    negotiator.end().await;
                    let _ = events.send(CallEvent::Ended(EndReason::ConnectionLost));
                    break;
                }
            },

            Some(event) = link_rx.recv() => match event {
                LinkEvent::CandidateGenerated(candidate) => {
                    if let Err(e) = negotiator.handle_local_candidate(candidate) {
                        warn!("Failed to signal local candidate: {}", e);
                    }
                }
                LinkEvent::TrackReceived { id, kind } => {
                    let _ = events.send(CallEvent::TrackReceived { id, kind });
                }
                LinkEvent::Disconnected => {
                    negotiator.end().await;
                    let _ = events.send(CallEvent::Ended(EndReason::ConnectionLost));
                    break;
                }
            },

            command = command_rx.recv() => match command {
                Some(CallCommand::SetMuted(muted)) => negotiator.set_muted(muted),
                Some(CallCommand::HangUp) | None => {
                    negotiator.end().await;
                    let _ = client.leave();
                    let _ = events.send(CallEvent::Ended(EndReason::HungUp));
                    break;
                }
            },
        }
    }

    info!("Call task finished");
}
