//! The shared broadcast session and its lifecycle.
//!
//! ```text
//! OFFLINE ──begin_starting──▶ STARTING ──go_live──▶ LIVE ──begin_ending──▶ ENDING ──reset──▶ OFFLINE
//! ```
//!
//! `reset` is also used when the admin drops, from any state.

use crate::domain::value_object::{ConnectionId, Timestamp};

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamStatus {
    #[default]
    Offline,
    Starting,
    Live,
    Ending,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamStatus::Offline => "offline",
            StreamStatus::Starting => "starting",
            StreamStatus::Live => "live",
            StreamStatus::Ending => "ending",
        }
    }
}

/// Denormalized product snapshot shown during a stream.
///
/// Captured from the admin's command payload; not a live reference to the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRef {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: Option<String>,
}

/// Session state. Created OFFLINE and mutated only by the coordinator and the reconciler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamSession {
    is_active: bool,
    status: StreamStatus,
    products: Vec<ProductRef>,
    viewer_count: u64,
    started_at: Option<Timestamp>,
    admin_connection_id: Option<ConnectionId>,
}

impl StreamSession {
    /// A fresh OFFLINE session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn status(&self) -> StreamStatus {
        self.status
    }

    pub fn products(&self) -> &[ProductRef] {
        &self.products
    }

    pub fn viewer_count(&self) -> u64 {
        self.viewer_count
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn admin_connection_id(&self) -> Option<&ConnectionId> {
        self.admin_connection_id.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.status == StreamStatus::Live
    }

    pub fn set_admin(&mut self, connection_id: ConnectionId) {
        self.admin_connection_id = Some(connection_id);
    }

    /// Clear the admin reference if it points at `connection_id`.
    pub fn clear_admin_if(&mut self, connection_id: &ConnectionId) {
        if self.admin_connection_id.as_ref() == Some(connection_id) {
            self.admin_connection_id = None;
        }
    }

    /// Enter STARTING with the product set chosen for the broadcast.
    ///
    /// May be entered from any status; the session is not active and counts
    /// no viewers until `go_live`.
    pub fn begin_starting(&mut self, products: Vec<ProductRef>) {
        self.status = StreamStatus::Starting;
        self.products = products;
        self.is_active = false;
        self.viewer_count = 0;
    }

    /// Enter LIVE. The admin counts as the first viewer.
    pub fn go_live(&mut self, now: Timestamp) {
        self.is_active = true;
        self.status = StreamStatus::Live;
        self.started_at = Some(now);
        self.viewer_count = 1;
    }

    pub fn replace_products(&mut self, products: Vec<ProductRef>) {
        self.products = products;
    }

    /// Enter ENDING. The session stops being active immediately.
    pub fn begin_ending(&mut self) {
        self.status = StreamStatus::Ending;
        self.is_active = false;
        self.viewer_count = 0;
    }

    /// Back to the OFFLINE defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Count a viewer joining. Only a LIVE session counts viewers.
    ///
    /// Returns the new count, or `None` when the session is not live.
    pub fn viewer_joined(&mut self) -> Option<u64> {
        if !self.is_live() {
            return None;
        }
        self.viewer_count += 1;
        Some(self.viewer_count)
    }

    /// Count a viewer leaving; never drops below zero.
    ///
    /// Returns the new count, or `None` when there was nobody to subtract.
    pub fn viewer_left(&mut self) -> Option<u64> {
        if self.viewer_count == 0 {
            return None;
        }
        self.viewer_count -= 1;
        Some(self.viewer_count)
    }
}
