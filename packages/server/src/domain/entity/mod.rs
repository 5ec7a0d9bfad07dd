//! Domain entities.

mod client;
mod live_stream;
mod session;

pub use client::{ClientEntry, ClientRegistry};
pub use live_stream::LiveStream;
pub use session::{ProductRef, StreamSession, StreamStatus};
