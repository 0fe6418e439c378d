//! Clients and models for the SICK Tag-LOC REST and WebSocket APIs

pub mod feed;
pub mod rest;
pub mod tag;
pub mod websocket;

use serde::Deserialize;

pub use feed::Feed;
pub use rest::{FeedType, RestClient};
pub use tag::Tag;
pub use websocket::WebSocketClient;

/// Header carrying the API key on both REST and WebSocket requests
pub const HEADER_API_KEY: &str = "X-ApiKey";

/// Paginated listing responses wrap their items in a `results` array
#[derive(Debug, Deserialize)]
pub(crate) struct ResultsPage<T> {
    pub results: Vec<T>,
}
