//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{Stream, sink::SinkExt, stream::StreamExt};
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{ConnectionId, ConnectionIdFactory},
    infrastructure::dto::parse_command,
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // The transport assigns the identity; clients never choose it
    let connection_id = ConnectionIdFactory::generate();
    tracing::info!("Client connected: '{}'", connection_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Spawns a task that receives frames from the rx channel and pushes them to the WebSocket sender.
///
/// # Arguments
///
/// * `rx` - Channel receiver for frames addressed to this connection
/// * `sender` - WebSocket sink to send frames to this client
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Parses each text frame and hands the command to the coordinator.
///
/// The loop is never aborted. It stops when the client closes or when `stop` fires, and only
/// between commands, so a command that has started always completes.
fn receiver_loop<S>(
    mut receiver: S,
    mut stop: oneshot::Receiver<()>,
    state: Arc<AppState>,
    connection_id: ConnectionId,
) -> tokio::task::JoinHandle<()>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                msg = receiver.next() => msg,
                _ = &mut stop => break,
            };
            let msg = match msg {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
                None => break,
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", connection_id, text.as_str());

                    let command = match parse_command(text.as_str()) {
                        Ok(command) => command,
                        Err(e) => {
                            tracing::warn!("Dropping frame from '{}': {}", connection_id, e);
                            continue;
                        }
                    };

                    let name = command.name();
                    // Scheduled continuations are detached and fire on their own
                    if let Err(rejected) = state
                        .session_coordinator
                        .dispatch(&connection_id, command)
                        .await
                    {
                        tracing::debug!(
                            "Ignored '{}' from '{}': {}",
                            name,
                            connection_id,
                            rejected
                        );
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", connection_id);
                    break;
                }
                // Protocol-level ping/pong is answered by the WebSocket layer
                _ => {}
            }
        }
    })
}

/// Wait until either half of the connection ends.
///
/// When the pusher ends first the receive loop is asked to stop and awaited, so no command
/// from this connection can touch the state after the caller reconciles.
async fn wait_for_close(
    mut send_task: tokio::task::JoinHandle<()>,
    mut recv_task: tokio::task::JoinHandle<()>,
    stop: oneshot::Sender<()>,
) {
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            // the receive loop may already be gone
            let _ = stop.send(());
            if let Err(e) = recv_task.await {
                tracing::error!("Receive loop failed: {}", e);
            }
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, receiver) = socket.split();

    // Register the outbound channel and push the current stream_state
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .connect_client_usecase
        .execute(connection_id.clone(), tx)
        .await;

    let send_task = pusher_loop(rx, sender);
    let (stop_tx, stop_rx) = oneshot::channel();
    let recv_task = receiver_loop(receiver, stop_rx, state.clone(), connection_id.clone());

    wait_for_close(send_task, recv_task, stop_tx).await;

    tracing::info!("Client disconnected: '{}'", connection_id);
    match state
        .disconnect_client_usecase
        .execute(&connection_id)
        .await
    {
        Some(role) => tracing::info!(
            "Reconciled '{}' ({}) after disconnect",
            connection_id,
            role.as_str()
        ),
        None => tracing::debug!("'{}' left without joining", connection_id),
    }
}
