//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::{
        conversion::client_info_dto,
        http::StreamClientsDto,
        websocket::StreamStateDto,
    },
    ui::state::AppState,
};

/// Current session state
pub async fn get_stream_status(State(state): State<Arc<AppState>>) -> Json<StreamStateDto> {
    let session = state.get_stream_status_usecase.execute().await;
    Json(StreamStateDto::from(&session))
}

/// Joined clients with their role and join metadata
pub async fn get_stream_clients(State(state): State<Arc<AppState>>) -> Json<StreamClientsDto> {
    let clients = state.get_stream_clients_usecase.execute().await;

    // Domain Model から DTO への変換
    let clients: Vec<_> = clients
        .iter()
        .map(|(id, entry)| client_info_dto(id, entry))
        .collect();

    Json(StreamClientsDto {
        total_clients: clients.len(),
        clients,
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
