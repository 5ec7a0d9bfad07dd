//! Infrastructure layer: wire formats, the WebSocket event channel and the in-memory store.

pub mod dto;
pub mod event_channel;
pub mod repository;
