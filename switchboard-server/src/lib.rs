mod app;
mod room;
mod signaling;

pub use app::{AppState, router};
pub use room::{ROOM_CAPACITY, Room, RoomCommand, RoomRegistry};
pub use signaling::{SignalingOutput, SignalingService};
