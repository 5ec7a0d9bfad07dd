//! UseCase layer: one type per operation on the live stream.

mod connect_client;
mod disconnect_client;
mod error;
mod get_stream_clients;
mod get_stream_status;
mod session_coordinator;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::CommandRejected;
pub use get_stream_clients::GetStreamClientsUseCase;
pub use get_stream_status::GetStreamStatusUseCase;
pub use session_coordinator::{ScheduledTransition, SessionCoordinator, TransitionToken};
