//! Live-shopping stream coordinator server.
//!
//! Tracks one shared broadcast session (offline → starting → live → ending),
//! lets a single admin drive it and fans every state change out to all
//! connected WebSocket clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin livestream-server
//! cargo run --bin livestream-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{collections::HashMap, sync::Arc};

use clap::Parser;
use tokio::sync::Mutex;

use livestream_server::{
    config::ServerConfig,
    domain::{EventChannel, StreamRepository},
    infrastructure::{event_channel::WebSocketEventChannel, repository::InMemoryStreamStore},
    ui::Server,
    usecase::{
        ConnectClientUseCase, DisconnectClientUseCase, GetStreamClientsUseCase,
        GetStreamStatusUseCase, SessionCoordinator,
    },
};
use livestream_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(
        &[env!("CARGO_BIN_NAME"), env!("CARGO_PKG_NAME"), "tower_http"],
        &config.log_level,
    );

    // Initialize dependencies in order:
    // 1. Store
    // 2. EventChannel
    // 3. UseCases
    // 4. Server

    // 1. Create the store (session state + client registry, in memory)
    let store: Arc<dyn StreamRepository> = Arc::new(InMemoryStreamStore::new());

    // 2. Create EventChannel (WebSocket implementation)
    let event_channel: Arc<dyn EventChannel> =
        Arc::new(WebSocketEventChannel::new(Arc::new(Mutex::new(HashMap::new()))));

    // 3. Create UseCases
    let timings = config.timings();
    tracing::info!(
        "Transition delays: starting {:?}, ending {:?}",
        timings.starting_delay,
        timings.ending_delay
    );
    let session_coordinator = Arc::new(SessionCoordinator::new(
        store.clone(),
        event_channel.clone(),
        Arc::new(SystemClock),
        timings,
    ));
    let connect_client_usecase = Arc::new(ConnectClientUseCase::new(
        store.clone(),
        event_channel.clone(),
    ));
    let disconnect_client_usecase = Arc::new(DisconnectClientUseCase::new(
        store.clone(),
        event_channel.clone(),
    ));
    let get_stream_status_usecase = Arc::new(GetStreamStatusUseCase::new(store.clone()));
    let get_stream_clients_usecase = Arc::new(GetStreamClientsUseCase::new(store));

    // 4. Create and run the server
    let server = Server::new(
        connect_client_usecase,
        disconnect_client_usecase,
        session_coordinator,
        get_stream_status_usecase,
        get_stream_clients_usecase,
    );
    if let Err(e) = server.run(config.bind_addr()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
