//! Utilities shared by the live-stream server and client.

pub mod logger;
pub mod time;
