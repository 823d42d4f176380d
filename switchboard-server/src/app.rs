use crate::room::RoomRegistry;
use crate::signaling::{SignalingService, ws_handler};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use switchboard_core::IceServerConfig;

/// Everything a relay connection needs: the peer registry and the rooms.
#[derive(Clone)]
pub struct AppState {
    pub service: SignalingService,
    pub rooms: RoomRegistry,
}

impl AppState {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        let service = SignalingService::new(ice_servers);
        let rooms = RoomRegistry::new(Arc::new(service.clone()));
        Self { service, rooms }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(vec![IceServerConfig::default_stun()])
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}
