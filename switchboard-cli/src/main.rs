use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use std::sync::Arc;
use switchboard_client::{
    CallEvent, CallSession, MediaConstraints, NegotiationPolicy, SignalingClient,
    SyntheticMediaSource, WebRtcConnector,
};
use switchboard_core::IceServerConfig;
use switchboard_server::{AppState, router};

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(about = "Two-party call signaling relay and client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve {
        #[arg(long, default_value = "127.0.0.1:7400")]
        addr: SocketAddr,

        /// Extra STUN/TURN urls handed to every peer.
        #[arg(long = "ice-url")]
        ice_urls: Vec<String>,
    },

    /// Join a room and run a call from the terminal.
    Call {
        #[arg(long, default_value = "ws://127.0.0.1:7400/ws")]
        relay: String,

        #[arg(long)]
        room: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { addr, ice_urls } => serve(addr, ice_urls).await,
        Commands::Call { relay, room } => call(relay, room).await,
    }
}

async fn serve(addr: SocketAddr, ice_urls: Vec<String>) -> Result<()> {
    let mut ice_servers = vec![IceServerConfig::default_stun()];
    if !ice_urls.is_empty() {
        ice_servers.push(IceServerConfig {
            urls: ice_urls,
            username: None,
            credential: None,
        });
    }

    let app = router(AppState::new(ice_servers));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    println!("{}", format!("Relay listening on ws://{addr}/ws").green());

    axum::serve(listener, app).await.context("Relay failed")?;
    Ok(())
}

async fn call(relay: String, room: Option<String>) -> Result<()> {
    let room = match room {
        Some(room) => room,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Room id")
            .interact_text()?,
    };

    let client = SignalingClient::connect(&relay)
        .await
        .context("Failed to reach the relay")?;
    println!(
        "{}",
        format!("Connected to relay as {}", client.peer_id()).green()
    );

    let mut session = CallSession::start(
        &client,
        &room,
        Arc::new(SyntheticMediaSource),
        Arc::new(WebRtcConnector),
        NegotiationPolicy::default(),
        MediaConstraints::default(),
    )
    .context("Failed to start the call")?;

    println!("{}", format!("Waiting in room '{}'...", room.trim()).cyan());

    loop {
        tokio::select! {
            event = session.next_event() => match event {
                Some(CallEvent::PeerJoined(peer)) => {
                    println!("{}", format!("Peer {peer} is here, negotiating...").cyan());
                }
                Some(CallEvent::Connected) => {
                    println!("{}", "Call connected.".green().bold());
                }
                Some(CallEvent::TrackReceived { id, kind }) => {
                    println!("{}", format!("Receiving {kind:?} track '{id}'").cyan());
                }
                Some(CallEvent::RoomFull) => {
                    println!("{}", "Room is full, try another room id.".red());
                    break;
                }
                Some(CallEvent::Ended(reason)) => {
                    println!("{}", format!("Call ended: {reason:?}").yellow());
                    break;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Hanging up...".yellow());
                session.hang_up();
            }
        }
    }

    client.close();
    Ok(())
}
