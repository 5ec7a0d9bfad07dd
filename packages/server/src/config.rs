//! Server configuration.

use std::time::Duration;

use clap::Parser;

/// Delays of the two timed transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTimings {
    /// STARTING → LIVE
    pub starting_delay: Duration,
    /// ENDING → OFFLINE
    pub ending_delay: Duration,
}

impl Default for StreamTimings {
    fn default() -> Self {
        Self {
            starting_delay: Duration::from_secs(2),
            ending_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "livestream-server")]
#[command(about = "Live-shopping stream coordinator over WebSocket", long_about = None)]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Delay before a starting stream goes live (milliseconds)
    #[arg(long, default_value_t = 2000)]
    pub start_delay_ms: u64,

    /// Delay before an ending stream goes offline (milliseconds)
    #[arg(long, default_value_t = 1000)]
    pub end_delay_ms: u64,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn timings(&self) -> StreamTimings {
        StreamTimings {
            starting_delay: Duration::from_millis(self.start_delay_ms),
            ending_delay: Duration::from_millis(self.end_delay_ms),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
