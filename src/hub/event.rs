//! Events consumed by the hub loop

use tokio::sync::oneshot;

use super::connection::Connection;
use super::message::Message;
use super::server::HubStats;

/// One unit of work for the hub loop
///
/// Events are handled strictly in arrival order, whatever their kind.
/// Membership changes carry an acknowledgement so the caller can wait until
/// the loop has actually consumed them.
pub(crate) enum HubEvent {
    Register {
        connection: Connection,
        ack: oneshot::Sender<()>,
    },
    Unregister {
        connection: Connection,
        ack: oneshot::Sender<()>,
    },
    Deliver(Message),
    /// Read-only membership snapshot; never mutates state
    Stats(oneshot::Sender<HubStats>),
}
