//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};

use livestream_server::{domain::Role, infrastructure::dto::websocket::ServerEvent};

use super::{
    command::{PromptCommand, encode, join_command, parse_line},
    error::ClientError,
    formatter::EventFormatter,
    ui::redisplay_prompt,
};

/// Run one connection: join, then relay prompt lines until quit or connection loss.
///
/// Returns `Ok(())` when the user quits and an error when the connection cannot be
/// established or is lost.
pub async fn run_client_session(
    url: &str,
    role: Role,
    name: &str,
    prompt: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url).await.map_err(|e| match e {
        tungstenite::Error::Url(_) => ClientError::InvalidUrl(url.to_string()),
        e => ClientError::ConnectionError(e.to_string()),
    })?;

    tracing::info!("Connected to stream server!");
    println!(
        "\nYou are '{}' ({}). Type 'start', 'update', 'end', 'cart', 'ping' or 'quit'.\n",
        name,
        role.as_str()
    );

    let (mut write, mut read) = ws_stream.split();

    // Every connection is a new identity on the server, so join again
    let join = encode(&join_command(role, name))
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    write
        .send(Message::Text(join.into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    let prompt_for_read = prompt.to_string();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => EventFormatter::format_event(&event),
                        Err(_) => EventFormatter::format_raw_message(&text),
                    };
                    print!("{}", formatted);
                    redisplay_prompt(&prompt_for_read);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", EventFormatter::format_binary_message(data.len()));
                    redisplay_prompt(&prompt_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut read_task => {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    // readline thread is gone (Ctrl+C / Ctrl+D)
                    read_task.abort();
                    write.close().await.ok();
                    return Ok(());
                };

                let command = match parse_line(&line) {
                    Ok(PromptCommand::Send(command)) => command,
                    Ok(PromptCommand::Quit) => {
                        read_task.abort();
                        write.close().await.ok();
                        return Ok(());
                    }
                    Err(e) => {
                        println!("{}", e);
                        redisplay_prompt(prompt);
                        continue;
                    }
                };

                let frame = match encode(&command) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!("Failed to serialize command: {}", e);
                        continue;
                    }
                };

                if let Err(e) = write.send(Message::Text(frame.into())).await {
                    tracing::warn!("Failed to send command: {}", e);
                    read_task.abort();
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
                tracing::debug!("Sent {}", command.name());
            }
        }
    }
}
