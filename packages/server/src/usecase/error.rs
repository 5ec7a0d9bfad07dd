//! UseCase error types.

use thiserror::Error;

/// Why a command was dropped.
///
/// Never reported to the client: the transport only logs it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandRejected {
    #[error("sender is not registered as admin")]
    NotAdmin,

    #[error("stream is not live")]
    NotLive,
}
