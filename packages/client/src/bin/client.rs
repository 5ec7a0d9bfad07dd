//! Live-stream terminal client with reconnection support.
//!
//! Connects to the stream server, joins as admin or viewer and sends the
//! commands typed at the prompt. Reconnects on disconnection (max 5 attempts
//! with 5 second interval) and joins again with the new connection.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin livestream-client -- --role admin --name host
//! cargo run --bin livestream-client -- -n alice
//! ```

use clap::{Parser, ValueEnum};

use livestream_server::domain::Role;
use livestream_shared::logger::setup_logger;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    Viewer,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::Viewer => Role::Viewer,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "livestream-client")]
#[command(about = "Terminal client for the live-stream server", long_about = None)]
struct Args {
    /// Display name sent with the join command
    #[arg(short = 'n', long)]
    name: String,

    /// Join as the stream admin or as a viewer
    #[arg(short = 'r', long, value_enum, default_value_t = RoleArg::Viewer)]
    role: RoleArg,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:3000/ws")]
    url: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    setup_logger(
        &[env!("CARGO_BIN_NAME"), env!("CARGO_PKG_NAME")],
        &args.log_level,
    );

    if let Err(e) = livestream_client::run_client(args.url, args.role.into(), args.name).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
