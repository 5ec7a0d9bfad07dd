//! Typed inbound commands and outbound events.

use super::{
    entity::{ProductRef, StreamSession},
    value_object::{ConnectionId, JoinMetadata, Timestamp},
};

/// A command sent by a connection, already validated at the channel boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamCommand {
    AdminJoin { metadata: JoinMetadata },
    UserJoin { metadata: JoinMetadata },
    StartStream { products: Vec<ProductRef> },
    UpdateProducts { products: Vec<ProductRef> },
    EndStream,
    AddToCart {
        product: Option<ProductRef>,
        product_name: Option<String>,
    },
    Ping,
}

impl StreamCommand {
    /// Wire name of the command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            StreamCommand::AdminJoin { .. } => "admin_join",
            StreamCommand::UserJoin { .. } => "user_join",
            StreamCommand::StartStream { .. } => "start_stream",
            StreamCommand::UpdateProducts { .. } => "update_products",
            StreamCommand::EndStream => "end_stream",
            StreamCommand::AddToCart { .. } => "add_to_cart",
            StreamCommand::Ping => "ping",
        }
    }
}

/// An event pushed from the server to one or more connections.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Full session snapshot, pushed to a connection right after it connects.
    StreamState(StreamSession),
    AdminConnected,
    AdminDisconnected,
    ViewerUpdate {
        viewer_count: u64,
    },
    StreamStarting {
        products: Vec<ProductRef>,
    },
    StreamLive {
        products: Vec<ProductRef>,
        viewer_count: u64,
        started_at: Timestamp,
    },
    ProductsUpdated {
        products: Vec<ProductRef>,
    },
    StreamEnding,
    StreamEnded,
    CartActivity {
        product: Option<ProductRef>,
        user_id: ConnectionId,
    },
    Pong,
}

impl StreamEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::StreamState(_) => "stream_state",
            StreamEvent::AdminConnected => "admin_connected",
            StreamEvent::AdminDisconnected => "admin_disconnected",
            StreamEvent::ViewerUpdate { .. } => "viewer_update",
            StreamEvent::StreamStarting { .. } => "stream_starting",
            StreamEvent::StreamLive { .. } => "stream_live",
            StreamEvent::ProductsUpdated { .. } => "products_updated",
            StreamEvent::StreamEnding => "stream_ending",
            StreamEvent::StreamEnded => "stream_ended",
            StreamEvent::CartActivity { .. } => "cart_activity",
            StreamEvent::Pong => "pong",
        }
    }
}
