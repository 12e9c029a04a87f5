//! # Fanhub
//!
//! Real-time fan-out hub: clients connect over WebSocket, send messages, and
//! every message is rebroadcast to every connected client. Liveness wins
//! over delivery: a client that cannot keep up is disconnected rather than
//! allowed to stall everyone else.
//!
//! ## Features
//!
//! - **Lock-free membership**: one event loop owns the set of connections
//! - **Bounded fan-out**: per-client outbound queues with drop-on-full
//! - **Pluggable diagnostics**: trace hub activity to nowhere, `tracing`,
//!   stdout, or memory
//! - **Health probes**: liveness, readiness and counters over HTTP
//!
//! ## Modules
//!
//! - [`hub`]: Event loop, connections, outbound queues, transport seam
//! - [`websocket`]: WebSocket acceptor and transport adapter
//! - [`diagnostics`]: Diagnostic sinks
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fanhub::hub::Hub;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (hub, _task) = Hub::with_defaults();
//!
//!     let (alice, mut alice_inbox) = hub.new_connection();
//!     let (bob, mut bob_inbox) = hub.new_connection();
//!     hub.register(&alice).await?;
//!     hub.register(&bob).await?;
//!
//!     hub.deliver("hi all").await?;
//!
//!     assert!(alice_inbox.recv().await.is_some());
//!     assert!(bob_inbox.recv().await.is_some());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod diagnostics;
pub mod hub;
pub mod websocket;

// Re-export top-level types for convenience
pub use hub::{
    Connection, ConnectionId, Hub, HubConfig, HubError, HubResult, HubStats, Message,
    OutboundQueue, OutboundReceiver, TransportError, TransportReader, TransportWriter,
};

pub use diagnostics::{
    DiagnosticSink, NoopSink, RecordingSink, SinkKind, TracingSink, WriterSink,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use websocket::websocket_handler;

pub use config::{Config, ConfigError, DiagnosticsConfig, LoggingConfig, ServerConfig};
