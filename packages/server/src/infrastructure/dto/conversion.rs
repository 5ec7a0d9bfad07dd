//! Conversion logic between DTOs and domain types.

use serde::de::DeserializeOwned;
use thiserror::Error;

use livestream_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ClientEntry, ConnectionId, JoinMetadata, ProductRef, StreamCommand, StreamEvent,
    StreamSession, StreamStatus,
};
use crate::infrastructure::dto::{http, websocket as dto};

const ADMIN_CONNECTED_MESSAGE: &str = "Admin has joined the stream";
const ADMIN_DISCONNECTED_MESSAGE: &str = "Admin has left the stream";
const ADD_TO_CART_ACTION: &str = "add_to_cart";

/// Why an inbound frame could not be turned into a command.
#[derive(Debug, Error)]
pub enum InboundMessageError {
    #[error("frame is not a valid event envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("invalid payload for '{event}': {source}")]
    InvalidPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse and validate one inbound text frame.
pub fn parse_command(text: &str) -> Result<StreamCommand, InboundMessageError> {
    let envelope: dto::ClientEnvelope =
        serde_json::from_str(text).map_err(InboundMessageError::InvalidEnvelope)?;
    StreamCommand::try_from(envelope)
}

/// Decode a payload; a missing (`null`) payload means "all defaults".
fn payload<T: DeserializeOwned + Default>(
    event: &str,
    data: serde_json::Value,
) -> Result<T, InboundMessageError> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|source| InboundMessageError::InvalidPayload {
        event: event.to_string(),
        source,
    })
}

fn products_from_dto(products: Vec<dto::ProductDto>) -> Vec<ProductRef> {
    products.into_iter().map(ProductRef::from).collect()
}

fn products_to_dto(products: &[ProductRef]) -> Vec<dto::ProductDto> {
    products.iter().cloned().map(dto::ProductDto::from).collect()
}

// ========================================
// DTO → Domain
// ========================================

impl From<dto::ProductDto> for ProductRef {
    fn from(dto: dto::ProductDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            price: dto.price,
            image: dto.image,
        }
    }
}

impl TryFrom<dto::ClientEnvelope> for StreamCommand {
    type Error = InboundMessageError;

    fn try_from(envelope: dto::ClientEnvelope) -> Result<Self, Self::Error> {
        let dto::ClientEnvelope { event, data } = envelope;
        let command = match event.as_str() {
            "admin_join" => StreamCommand::AdminJoin {
                metadata: payload::<JoinMetadata>(&event, data)?,
            },
            "user_join" => StreamCommand::UserJoin {
                metadata: payload::<JoinMetadata>(&event, data)?,
            },
            "start_stream" => {
                let payload = payload::<dto::ProductsPayload>(&event, data)?;
                StreamCommand::StartStream {
                    products: products_from_dto(payload.products),
                }
            }
            "update_products" => {
                let payload = payload::<dto::ProductsPayload>(&event, data)?;
                StreamCommand::UpdateProducts {
                    products: products_from_dto(payload.products),
                }
            }
            "end_stream" => StreamCommand::EndStream,
            "add_to_cart" => {
                let payload = payload::<dto::AddToCartPayload>(&event, data)?;
                StreamCommand::AddToCart {
                    product: payload.product.map(ProductRef::from),
                    product_name: payload.product_name,
                }
            }
            "ping" => StreamCommand::Ping,
            _ => return Err(InboundMessageError::UnknownEvent(event)),
        };
        Ok(command)
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<ProductRef> for dto::ProductDto {
    fn from(model: ProductRef) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: model.price,
            image: model.image,
        }
    }
}

impl From<StreamStatus> for dto::StreamStatusDto {
    fn from(status: StreamStatus) -> Self {
        match status {
            StreamStatus::Offline => Self::Offline,
            StreamStatus::Starting => Self::Starting,
            StreamStatus::Live => Self::Live,
            StreamStatus::Ending => Self::Ending,
        }
    }
}

impl From<&StreamSession> for dto::StreamStateDto {
    fn from(session: &StreamSession) -> Self {
        Self {
            is_active: session.is_active(),
            status: session.status().into(),
            products: products_to_dto(session.products()),
            viewer_count: session.viewer_count(),
            started_at: session
                .started_at()
                .map(|started_at| timestamp_to_rfc3339(started_at.value())),
            admin_connection_id: session
                .admin_connection_id()
                .map(|id| id.as_str().to_string()),
        }
    }
}

impl From<&StreamEvent> for dto::ServerEvent {
    fn from(event: &StreamEvent) -> Self {
        match event {
            StreamEvent::StreamState(session) => Self::StreamState(session.into()),
            StreamEvent::AdminConnected => Self::AdminConnected(dto::NoticePayload {
                message: ADMIN_CONNECTED_MESSAGE.to_string(),
            }),
            StreamEvent::AdminDisconnected => Self::AdminDisconnected(dto::NoticePayload {
                message: ADMIN_DISCONNECTED_MESSAGE.to_string(),
            }),
            StreamEvent::ViewerUpdate { viewer_count } => {
                Self::ViewerUpdate(dto::ViewerUpdatePayload {
                    viewer_count: *viewer_count,
                })
            }
            StreamEvent::StreamStarting { products } => {
                Self::StreamStarting(dto::StreamStartingPayload {
                    status: dto::StreamStatusDto::Starting,
                    products: products_to_dto(products),
                })
            }
            StreamEvent::StreamLive {
                products,
                viewer_count,
                started_at,
            } => Self::StreamLive(dto::StreamLivePayload {
                status: dto::StreamStatusDto::Live,
                is_active: true,
                products: products_to_dto(products),
                viewer_count: *viewer_count,
                started_at: timestamp_to_rfc3339(started_at.value()),
            }),
            StreamEvent::ProductsUpdated { products } => {
                Self::ProductsUpdated(dto::ProductsPayload {
                    products: products_to_dto(products),
                })
            }
            StreamEvent::StreamEnding => Self::StreamEnding(dto::StreamEndingPayload {
                status: dto::StreamStatusDto::Ending,
            }),
            StreamEvent::StreamEnded => Self::StreamEnded(dto::StreamEndedPayload {
                status: dto::StreamStatusDto::Offline,
                is_active: false,
                products: Vec::new(),
                viewer_count: 0,
            }),
            StreamEvent::CartActivity { product, user_id } => {
                Self::CartActivity(dto::CartActivityPayload {
                    action: ADD_TO_CART_ACTION.to_string(),
                    product: product.clone().map(dto::ProductDto::from),
                    user_id: user_id.as_str().to_string(),
                })
            }
            StreamEvent::Pong => Self::Pong,
        }
    }
}

/// Build the wire envelope for a command (used by clients).
impl From<&StreamCommand> for dto::ClientEnvelope {
    fn from(command: &StreamCommand) -> Self {
        let data = match command {
            StreamCommand::AdminJoin { metadata } | StreamCommand::UserJoin { metadata } => {
                serde_json::Value::Object(metadata.clone())
            }
            StreamCommand::StartStream { products }
            | StreamCommand::UpdateProducts { products } => {
                serde_json::json!({ "products": products_to_dto(products) })
            }
            StreamCommand::AddToCart {
                product,
                product_name,
            } => serde_json::json!({
                "product": product.clone().map(dto::ProductDto::from),
                "productName": product_name,
            }),
            StreamCommand::EndStream | StreamCommand::Ping => serde_json::Value::Null,
        };
        Self {
            event: command.name().to_string(),
            data,
        }
    }
}

/// Listing entry for `GET /stream/clients`. `id` and `role` take precedence over metadata keys.
pub fn client_info_dto(connection_id: &ConnectionId, entry: &ClientEntry) -> http::ClientInfoDto {
    let mut metadata = entry.metadata.clone();
    metadata.remove("id");
    metadata.remove("role");
    http::ClientInfoDto {
        id: connection_id.as_str().to_string(),
        role: entry.role.as_str().to_string(),
        metadata,
    }
}
