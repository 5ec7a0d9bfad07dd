//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::usecase::{
    ConnectClientUseCase, DisconnectClientUseCase, GetStreamClientsUseCase,
    GetStreamStatusUseCase, SessionCoordinator,
};

use super::{
    handler::{get_stream_clients, get_stream_status, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Live-stream server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_client_usecase,
///     disconnect_client_usecase,
///     session_coordinator,
///     get_stream_status_usecase,
///     get_stream_clients_usecase,
/// );
/// server.run("127.0.0.1:3000".to_string()).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        connect_client_usecase: Arc<ConnectClientUseCase>,
        disconnect_client_usecase: Arc<DisconnectClientUseCase>,
        session_coordinator: Arc<SessionCoordinator>,
        get_stream_status_usecase: Arc<GetStreamStatusUseCase>,
        get_stream_clients_usecase: Arc<GetStreamClientsUseCase>,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                connect_client_usecase,
                disconnect_client_usecase,
                session_coordinator,
                get_stream_status_usecase,
                get_stream_clients_usecase,
            }),
        }
    }

    /// Build the router with all endpoints
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント（診断用・読み取り専用）
            .route("/stream/status", get(get_stream_status))
            .route("/stream/clients", get(get_stream_clients))
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, bind_addr: String) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Live-stream server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
