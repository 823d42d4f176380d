pub mod model;

pub use model::{
    IceCandidate, IceServerConfig, InvalidRoomId, PeerId, RoomId, SignalMessage,
};
