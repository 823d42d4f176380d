pub use switchboard_core::PeerId;

pub mod model {
    pub use switchboard_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use switchboard_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use switchboard_client::*;
}
