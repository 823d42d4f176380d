mod test_disconnect_triggers_peer_left;
mod test_handshake_assigns_identity;
