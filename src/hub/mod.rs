//! Fan-out Hub
//!
//! The core of fanhub: a single event loop that owns connection membership,
//! plus the per-connection pumps that feed it.
//!
//! ## Architecture
//!
//! - **Hub**: serializes Register, Unregister and Deliver events through one
//!   task; membership is never locked
//! - **Connection**: one client session with an inbound and an outbound pump
//! - **OutboundQueue**: bounded per-connection buffer; a full queue gets its
//!   connection dropped instead of stalling the loop
//! - **Transport**: the read-one / write-one seam adapters implement
//!
//! ## Example
//!
//! ```rust,no_run
//! use fanhub::hub::Hub;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (hub, _task) = Hub::with_defaults();
//!
//!     let (connection, mut outbound) = hub.new_connection();
//!     hub.register(&connection).await?;
//!     hub.deliver("hello").await?;
//!
//!     assert_eq!(outbound.recv().await.unwrap().as_bytes(), b"hello");
//!     Ok(())
//! }
//! ```

mod connection;
mod error;
mod event;
mod message;
mod queue;
mod server;
mod transport;

pub use connection::{join, Connection, ConnectionId};
pub use error::{HubError, HubResult, TransportError};
pub use message::Message;
pub use queue::{EnqueueError, OutboundQueue, OutboundReceiver};
pub use server::{Hub, HubConfig, HubStats};
pub use transport::{TransportReader, TransportWriter};
