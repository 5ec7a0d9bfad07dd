//! WebSocket event DTOs.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`.
//! Field names inside payloads are camelCase.

use serde::{Deserialize, Serialize};

/// Product snapshot as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatusDto {
    Offline,
    Starting,
    Live,
    Ending,
}

/// Full session snapshot (`stream_state` event and `GET /stream/status`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStateDto {
    pub is_active: bool,
    pub status: StreamStatusDto,
    pub products: Vec<ProductDto>,
    pub viewer_count: u64,
    pub started_at: Option<String>,
    pub admin_connection_id: Option<String>,
}

// ========================================
// Inbound (client → server)
// ========================================

/// Raw inbound frame, before the payload is validated against the event name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEnvelope {
    pub event: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

/// Payload of `start_stream` and `update_products` (and of `products_updated`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductsPayload {
    #[serde(default)]
    pub products: Vec<ProductDto>,
}

/// Payload of `add_to_cart`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartPayload {
    #[serde(default)]
    pub product: Option<ProductDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

// ========================================
// Outbound (server → client)
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    StreamState(StreamStateDto),
    AdminConnected(NoticePayload),
    AdminDisconnected(NoticePayload),
    ViewerUpdate(ViewerUpdatePayload),
    StreamStarting(StreamStartingPayload),
    StreamLive(StreamLivePayload),
    ProductsUpdated(ProductsPayload),
    StreamEnding(StreamEndingPayload),
    StreamEnded(StreamEndedPayload),
    CartActivity(CartActivityPayload),
    Pong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticePayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerUpdatePayload {
    pub viewer_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamStartingPayload {
    pub status: StreamStatusDto,
    pub products: Vec<ProductDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamLivePayload {
    pub status: StreamStatusDto,
    pub is_active: bool,
    pub products: Vec<ProductDto>,
    pub viewer_count: u64,
    pub started_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEndingPayload {
    pub status: StreamStatusDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEndedPayload {
    pub status: StreamStatusDto,
    pub is_active: bool,
    pub products: Vec<ProductDto>,
    pub viewer_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartActivityPayload {
    pub action: String,
    pub product: Option<ProductDto>,
    pub user_id: String,
}
