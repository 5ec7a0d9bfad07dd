//! WebSocket / HTTP surface of the live-stream server.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
