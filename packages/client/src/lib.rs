//! Terminal client for the live-stream server.
//!
//! Joins as admin or viewer, prints every server event and sends the commands typed at the prompt.

pub mod command;
mod domain;
pub mod error;
pub mod formatter;
mod runner;
mod session;
mod ui;

pub use error::{ClientError, CommandError};
pub use runner::run_client;
