pub mod link;
pub mod media;
pub mod session;
pub mod signaling;

pub use link::{LinkConfig, LinkError, LinkEvent, PeerConnector, PeerLink, SdpKind, WebRtcConnector};
pub use media::{
    MediaConstraints, MediaError, MediaSource, MediaStream, MediaTrack, SyntheticMediaSource,
    TrackKind,
};
pub use session::{
    CallCommand, CallEvent, CallSession, CallState, CaptureTiming, EndReason, NegotiationError,
    NegotiationPolicy, OffererPolicy, Role, SessionNegotiator, SignalSink,
};
pub use signaling::{SignalingClient, SignalingError, Subscription};
