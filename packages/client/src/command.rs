//! Prompt commands and their wire encoding.
//!
//! | input                         | sent as            |
//! |-------------------------------|--------------------|
//! | `start <id:name:price>...`    | `start_stream`     |
//! | `update <id:name:price>...`   | `update_products`  |
//! | `end`                         | `end_stream`       |
//! | `cart <id:name:price>`        | `add_to_cart`      |
//! | `ping`                        | `ping`             |
//! | `quit`                        | (closes the client)|

use livestream_server::{
    domain::{JoinMetadata, ProductRef, Role, StreamCommand},
    infrastructure::dto::websocket::ClientEnvelope,
};

use crate::error::CommandError;

/// A parsed prompt line
#[derive(Debug, Clone, PartialEq)]
pub enum PromptCommand {
    Send(StreamCommand),
    Quit,
}

/// Parse one non-empty prompt line.
pub fn parse_line(line: &str) -> Result<PromptCommand, CommandError> {
    let mut tokens = line.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Err(CommandError::UnknownCommand(String::new()));
    };
    let args: Vec<&str> = tokens.collect();

    let command = match keyword {
        "start" => StreamCommand::StartStream {
            products: parse_products(&args)?,
        },
        "update" => {
            if args.is_empty() {
                return Err(CommandError::MissingProduct("update"));
            }
            StreamCommand::UpdateProducts {
                products: parse_products(&args)?,
            }
        }
        "end" => StreamCommand::EndStream,
        "cart" => {
            let token = args.first().ok_or(CommandError::MissingProduct("cart"))?;
            let product = parse_product(token)?;
            StreamCommand::AddToCart {
                product_name: Some(product.name.clone()),
                product: Some(product),
            }
        }
        "ping" => StreamCommand::Ping,
        "quit" | "exit" => return Ok(PromptCommand::Quit),
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };
    Ok(PromptCommand::Send(command))
}

/// The join command sent right after every (re)connect.
pub fn join_command(role: Role, name: &str) -> StreamCommand {
    let mut metadata = JoinMetadata::new();
    metadata.insert("name".to_string(), serde_json::Value::from(name));
    match role {
        Role::Admin => StreamCommand::AdminJoin { metadata },
        Role::Viewer => StreamCommand::UserJoin { metadata },
    }
}

/// Serialize a command into an outbound text frame.
pub fn encode(command: &StreamCommand) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ClientEnvelope::from(command))
}

fn parse_products(tokens: &[&str]) -> Result<Vec<ProductRef>, CommandError> {
    tokens.iter().map(|token| parse_product(token)).collect()
}

/// `id:name:price`. The name may itself contain `:`; the id and price may not.
fn parse_product(token: &str) -> Result<ProductRef, CommandError> {
    let invalid = || CommandError::InvalidProduct(token.to_string());
    let (id, rest) = token.split_once(':').ok_or_else(invalid)?;
    let (name, price) = rest.rsplit_once(':').ok_or_else(invalid)?;
    if id.is_empty() || name.is_empty() {
        return Err(invalid());
    }
    let invalid_price = || CommandError::InvalidPrice(price.to_string());
    let value: f64 = price.parse().map_err(|_| invalid_price())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid_price());
    }

    Ok(ProductRef {
        id: id.to_string(),
        name: name.replace('_', " "),
        price: value,
        image: None,
    })
}
