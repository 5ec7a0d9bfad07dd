//! The aggregate guarded by the single state lock.

use super::{ClientRegistry, StreamSession};

/// Session state plus the registry of joined clients.
///
/// Both halves are read and written together so that the admin reference in
/// the session never outlives its registry entry.
#[derive(Debug, Default)]
pub struct LiveStream {
    pub session: StreamSession,
    pub clients: ClientRegistry,
}

impl LiveStream {
    pub fn new() -> Self {
        Self::default()
    }
}
