//! Connection to the speech-recognition service.
//!
//! The service speaks JSON text frames over a WebSocket: it pushes command
//! objects and `{"error": ...}` objects, and accepts `start_recognition`
//! requests.  See [`ws_client`] for the reconnect loop.

pub mod ws_client;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

pub use ws_client::{outbound_channel, run_transport, Outbox, WsPeer};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<WsError>,
    },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<WsError>),

    #[error("failed to encode outbound frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("recognition service is unreachable")]
    Offline,

    #[error("outbound queue is full")]
    QueueFull,

    #[error("transport task has stopped")]
    Stopped,
}

impl From<WsError> for TransportError {
    fn from(e: WsError) -> Self {
        Self::WebSocket(Box::new(e))
    }
}
