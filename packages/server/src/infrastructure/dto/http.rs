//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::JoinMetadata;

/// One joined connection in `GET /stream/clients`: `{id, role, ...joinMetadata}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfoDto {
    pub id: String,
    pub role: String,
    #[serde(flatten)]
    pub metadata: JoinMetadata,
}

/// Response body of `GET /stream/clients`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamClientsDto {
    pub total_clients: usize,
    pub clients: Vec<ClientInfoDto>,
}
