//! Domain layer: session state, client registry and the event vocabulary.
//!
//! This layer has no knowledge of WebSocket, JSON or HTTP.

pub mod entity;
pub mod error;
pub mod event;
pub mod event_channel;
pub mod repository;
pub mod value_object;

pub use entity::{ClientEntry, ClientRegistry, LiveStream, ProductRef, StreamSession, StreamStatus};
pub use error::EventPushError;
pub use event::{StreamCommand, StreamEvent};
pub use event_channel::{EventChannel, PusherChannel};
#[cfg(test)]
pub use event_channel::MockEventChannel;
pub use repository::StreamRepository;
pub use value_object::{ConnectionId, ConnectionIdFactory, JoinMetadata, Role, Timestamp};
