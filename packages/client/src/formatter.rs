//! Event formatting for client display.

use livestream_server::infrastructure::dto::websocket::{
    ProductDto, ServerEvent, StreamStateDto, StreamStatusDto,
};

const RULE: &str = "============================================================";

/// Event formatter for client display
pub struct EventFormatter;

impl EventFormatter {
    /// Format any server event as printable text (leading and trailing newline included)
    pub fn format_event(event: &ServerEvent) -> String {
        match event {
            ServerEvent::StreamState(state) => Self::format_stream_state(state),
            ServerEvent::AdminConnected(notice) | ServerEvent::AdminDisconnected(notice) => {
                format!("\n* {}\n", notice.message)
            }
            ServerEvent::ViewerUpdate(payload) => {
                format!("\n~ viewers: {}\n", payload.viewer_count)
            }
            ServerEvent::StreamStarting(payload) => format!(
                "\n> stream starting...\n{}",
                Self::format_products(&payload.products)
            ),
            ServerEvent::StreamLive(payload) => format!(
                "\n* LIVE since {} ({} watching)\n{}",
                payload.started_at,
                payload.viewer_count,
                Self::format_products(&payload.products)
            ),
            ServerEvent::ProductsUpdated(payload) => format!(
                "\n# products updated\n{}",
                Self::format_products(&payload.products)
            ),
            ServerEvent::StreamEnding(_) => "\n> stream ending...\n".to_string(),
            ServerEvent::StreamEnded(_) => "\n> stream ended\n".to_string(),
            ServerEvent::CartActivity(payload) => {
                let product = payload
                    .product
                    .as_ref()
                    .map(|product| format!("{} ({})", product.name, product.id))
                    .unwrap_or_else(|| "an unknown product".to_string());
                format!("\n$ {} added {} to cart\n", payload.user_id, product)
            }
            ServerEvent::Pong => "\n<- pong\n".to_string(),
        }
    }

    /// Format the session snapshot received on connect
    pub fn format_stream_state(state: &StreamStateDto) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!("Stream: {}\n", Self::status_label(state.status)));
        if let Some(started_at) = &state.started_at {
            output.push_str(&format!("Started at: {}\n", started_at));
        }
        output.push_str(&format!("Viewers: {}\n", state.viewer_count));
        output.push_str(&format!(
            "Admin: {}\n",
            state.admin_connection_id.as_deref().unwrap_or("(none)")
        ));
        output.push_str(&Self::format_products(&state.products));
        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format a product list, one product per line
    pub fn format_products(products: &[ProductDto]) -> String {
        if products.is_empty() {
            return "(No products)\n".to_string();
        }
        products
            .iter()
            .map(|product| {
                format!(
                    "  - [{}] {} ${:.2}\n",
                    product.id, product.name, product.price
                )
            })
            .collect()
    }

    /// Format a frame that is not a known server event
    pub fn format_raw_message(text: &str) -> String {
        format!("\n<- Received: {}\n", text)
    }

    /// Format a binary frame notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n<- Received {} bytes of binary data\n", byte_count)
    }

    fn status_label(status: StreamStatusDto) -> &'static str {
        match status {
            StreamStatusDto::Offline => "OFFLINE",
            StreamStatusDto::Starting => "STARTING",
            StreamStatusDto::Live => "LIVE",
            StreamStatusDto::Ending => "ENDING",
        }
    }
}
