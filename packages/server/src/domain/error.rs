//! Domain error types.

use thiserror::Error;

/// Failure to hand an event to a single connection.
///
/// Broadcasts swallow these per recipient; only `unicast` reports them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventPushError {
    #[error("connection '{0}' is not live")]
    ConnectionNotFound(String),

    #[error("failed to push event: {0}")]
    PushFailed(String),
}
