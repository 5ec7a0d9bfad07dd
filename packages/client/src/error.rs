//! Error types for the live-stream client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server URL cannot be used for a WebSocket connection
    #[error("Invalid server URL '{0}'")]
    InvalidUrl(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Errors raised while parsing a line typed at the prompt
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}' (try: start, update, end, cart, ping, quit)")]
    UnknownCommand(String),

    #[error("'{0}' needs at least one product as id:name:price")]
    MissingProduct(&'static str),

    #[error("Invalid product '{0}', expected id:name:price")]
    InvalidProduct(String),

    #[error("Invalid price '{0}'")]
    InvalidPrice(String),
}
