//! WebSocket Acceptor
//!
//! Upgrades HTTP requests to WebSocket and hands each socket to the hub as
//! one connection.
//!
//! ## Architecture
//!
//! - **Handler**: performs the upgrade and runs the connection join sequence
//! - **Transport**: adapts the split axum socket to the hub's transport traits
//!
//! ## Example
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8080/room');
//!
//! ws.onopen = () => ws.send('hello everyone');
//! ws.onmessage = (event) => console.log('Received:', event.data);
//! ```

mod handler;
mod transport;

pub use handler::websocket_handler;
pub use transport::{WsReader, WsWriter};
