use crate::media::stream::{MediaConstraints, MediaStream, MediaTrack, TrackKind};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media capture permission denied")]
    PermissionDenied,

    #[error("no capture device available")]
    NoDevice,

    #[error("capture backend failure: {0}")]
    Backend(String),
}

/// Provider of local audio/video capture. Out of scope for the signaling
/// core; implementations wrap whatever capture backend the host offers.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn capture(&self, constraints: MediaConstraints) -> Result<MediaStream, MediaError>;
}

/// Fabricates tracks without touching any device. Used by the CLI demo and
/// tests; a real deployment plugs in an OS capture backend instead.
pub struct SyntheticMediaSource;

#[async_trait]
impl MediaSource for SyntheticMediaSource {
    async fn capture(&self, constraints: MediaConstraints) -> Result<MediaStream, MediaError> {
        let mut tracks = Vec::new();
        if constraints.audio {
            tracks.push(MediaTrack::new(TrackKind::Audio, "audio-0"));
        }
        if constraints.video {
            tracks.push(MediaTrack::new(TrackKind::Video, "video-0"));
        }
        Ok(MediaStream::new(tracks))
    }
}
