//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and runs each socket as a hub
//! connection.

use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::StreamExt;
use std::sync::Arc;

use super::transport::{WsReader, WsWriter};
use crate::api::AppState;
use crate::hub::{self, Hub};

/// WebSocket upgrade handler
///
/// A failed handshake is logged and discarded; it never affects the hub or
/// any other connection.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hub = state.hub.clone();

    ws.max_message_size(state.config.max_message_size)
        .on_failed_upgrade(|error: axum::Error| {
            tracing::warn!(error = %error, "WebSocket upgrade failed");
        })
        .on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Run an established WebSocket as one hub connection
async fn handle_socket(socket: WebSocket, hub: Hub) {
    let (sink, stream) = socket.split();

    // The outbound pump is left to finish on its own.
    if let Err(e) = hub::join(hub, WsReader::new(stream), WsWriter::new(sink)).await {
        tracing::error!(error = %e, "Failed to register WebSocket connection");
    }
}
