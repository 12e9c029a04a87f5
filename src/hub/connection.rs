//! Connections and their pumps
//!
//! Each client session runs two independent pumps:
//!
//! ```text
//! transport ──read──▶ inbound pump ──Deliver──▶ hub loop
//! hub loop ──try_enqueue──▶ outbound queue ──▶ outbound pump ──write──▶ transport
//! ```
//!
//! The inbound pump runs on the accepting task and always ends with an
//! Unregister. The outbound pump is spawned and stops once its queue is
//! closed and drained, or when a write fails.

use std::fmt;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::error::HubResult;
use super::queue::{OutboundQueue, OutboundReceiver};
use super::server::Hub;
use super::transport::{TransportReader, TransportWriter};

/// Stable, never reused identity of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Hub-side view of a client session: its identity and outbound queue
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    outbound: OutboundQueue,
}

impl Connection {
    /// Create a connection with a fresh identity and a queue of `capacity`
    pub fn new(capacity: usize) -> (Self, OutboundReceiver) {
        let (outbound, receiver) = OutboundQueue::bounded(capacity);
        let connection = Self {
            id: ConnectionId::new(),
            outbound,
        };
        (connection, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn outbound(&self) -> &OutboundQueue {
        &self.outbound
    }

    pub(crate) fn into_outbound(self) -> OutboundQueue {
        self.outbound
    }
}

/// Run one client session against the hub
///
/// Registers the connection, spawns its outbound pump, then runs the
/// inbound pump on the calling task until the transport closes or fails.
/// Returns the outbound pump's handle; dropping it detaches the pump.
pub async fn join<R, W>(hub: Hub, reader: R, writer: W) -> HubResult<JoinHandle<()>>
where
    R: TransportReader,
    W: TransportWriter + 'static,
{
    let (connection, outbound) = hub.new_connection();
    let id = connection.id();

    hub.register(&connection).await?;
    tracing::info!(connection_id = %id, "Client connected");

    let guard = UnregisterGuard::new(hub.clone(), connection);
    let outbound_task = tokio::spawn(outbound_pump(id, outbound, writer));

    inbound_pump(&hub, id, reader).await;
    guard.release().await;

    tracing::info!(connection_id = %id, "Client disconnected");
    Ok(outbound_task)
}

async fn inbound_pump<R: TransportReader>(hub: &Hub, id: ConnectionId, mut reader: R) {
    loop {
        match reader.read_message().await {
            Ok(Some(message)) => {
                if let Err(e) = hub.deliver(message).await {
                    tracing::warn!(connection_id = %id, error = %e, "Hub refused message");
                    break;
                }
            }
            Ok(None) => {
                tracing::debug!(connection_id = %id, "Client closed transport");
                break;
            }
            Err(e) => {
                tracing::debug!(connection_id = %id, error = %e, "Transport read failed");
                break;
            }
        }
    }
}

async fn outbound_pump<W: TransportWriter>(
    id: ConnectionId,
    mut outbound: OutboundReceiver,
    mut writer: W,
) {
    while let Some(message) = outbound.recv().await {
        if let Err(e) = writer.write_message(message).await {
            tracing::debug!(connection_id = %id, error = %e, "Transport write failed");
            break;
        }
    }

    if let Err(e) = writer.close().await {
        tracing::debug!(connection_id = %id, error = %e, "Transport close failed");
    }
}

/// Issues the connection's Unregister exactly once
///
/// `release` does it in line. If the inbound pump is unwound or cancelled
/// first, `Drop` hands the Unregister to a fresh task instead.
struct UnregisterGuard {
    hub: Hub,
    connection: Option<Connection>,
}

impl UnregisterGuard {
    fn new(hub: Hub, connection: Connection) -> Self {
        Self {
            hub,
            connection: Some(connection),
        }
    }

    async fn release(mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(e) = self.hub.unregister(&connection).await {
                tracing::debug!(connection_id = %connection.id(), error = %e, "Unregister skipped");
            }
        }
    }
}

impl Drop for UnregisterGuard {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let hub = self.hub.clone();
                runtime.spawn(async move {
                    let _ = hub.unregister(&connection).await;
                });
            }
            Err(_) => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    "No runtime available, connection left registered"
                );
            }
        }
    }
}
