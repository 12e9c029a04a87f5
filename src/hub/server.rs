//! Hub event loop and handle
//!
//! A single task owns the membership set and consumes events one at a time,
//! so membership is never shared and never locked. Everything else talks to
//! it through a cloneable [`Hub`] handle.

use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::connection::{Connection, ConnectionId};
use super::error::{HubError, HubResult};
use super::event::HubEvent;
use super::message::Message;
use super::queue::{OutboundQueue, OutboundReceiver};
use crate::diagnostics::{DiagnosticSink, NoopSink};

/// Configuration for the hub
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    /// Pending messages each connection may hold before it is dropped
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,

    /// Events that may wait for the loop before senders start blocking
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_outbound_capacity() -> usize {
    256
}

fn default_event_capacity() -> usize {
    64
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: default_outbound_capacity(),
            event_capacity: default_event_capacity(),
        }
    }
}

/// Snapshot of hub membership and lifetime counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Currently registered connections
    pub connections: usize,
    /// Connections ever added to the membership set
    pub registered: u64,
    /// Connections removed by an explicit departure
    pub unregistered: u64,
    /// Connections removed because their outbound queue could not accept
    pub dropped: u64,
    /// Messages received for fan-out
    pub messages: u64,
    /// Individual per-connection enqueues that succeeded
    pub delivered: u64,
}

/// Handle to a running hub loop
#[derive(Clone)]
pub struct Hub {
    events: mpsc::Sender<HubEvent>,
    outbound_capacity: usize,
}

impl Hub {
    /// Start a hub loop on the current runtime
    ///
    /// The loop runs until every handle has been dropped, then closes the
    /// outbound queue of every connection still registered.
    pub fn spawn(config: HubConfig, sink: Arc<dyn DiagnosticSink>) -> (Hub, JoinHandle<()>) {
        let (events, rx) = mpsc::channel(config.event_capacity.max(1));
        let task = tokio::spawn(HubLoop::new(sink).run(rx));

        let hub = Hub {
            events,
            outbound_capacity: config.outbound_capacity.max(1),
        };

        (hub, task)
    }

    /// Start a hub with default configuration and no diagnostics
    pub fn with_defaults() -> (Hub, JoinHandle<()>) {
        Self::spawn(HubConfig::default(), Arc::new(NoopSink))
    }

    /// Allocate a connection identity and its outbound queue
    pub fn new_connection(&self) -> (Connection, OutboundReceiver) {
        Connection::new(self.outbound_capacity)
    }

    /// Add a connection; returns once the loop has processed it
    pub async fn register(&self, connection: &Connection) -> HubResult<()> {
        let (ack, done) = oneshot::channel();
        self.send(HubEvent::Register {
            connection: connection.clone(),
            ack,
        })
        .await?;
        done.await.map_err(|_| HubError::Closed)
    }

    /// Remove a connection; returns once the loop has processed it
    pub async fn unregister(&self, connection: &Connection) -> HubResult<()> {
        let (ack, done) = oneshot::channel();
        self.send(HubEvent::Unregister {
            connection: connection.clone(),
            ack,
        })
        .await?;
        done.await.map_err(|_| HubError::Closed)
    }

    /// Hand a message to the loop for fan-out
    ///
    /// Waits while the event intake is full.
    pub async fn deliver(&self, message: impl Into<Message>) -> HubResult<()> {
        self.send(HubEvent::Deliver(message.into())).await
    }

    /// Query membership and counters
    pub async fn stats(&self) -> HubResult<HubStats> {
        let (reply, answer) = oneshot::channel();
        self.send(HubEvent::Stats(reply)).await?;
        answer.await.map_err(|_| HubError::Closed)
    }

    async fn send(&self, event: HubEvent) -> HubResult<()> {
        self.events.send(event).await.map_err(|_| HubError::Closed)
    }
}

/// State owned by the loop task
struct HubLoop {
    members: HashMap<ConnectionId, OutboundQueue>,
    sink: Arc<dyn DiagnosticSink>,
    stats: HubStats,
}

impl HubLoop {
    fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            members: HashMap::new(),
            sink,
            stats: HubStats::default(),
        }
    }

    async fn run(mut self, mut events: mpsc::Receiver<HubEvent>) {
        tracing::debug!("Hub loop started");

        while let Some(event) = events.recv().await {
            self.handle(event);
        }

        let remaining = self.members.len();
        for (_, queue) in self.members.drain() {
            queue.close();
        }

        tracing::debug!(remaining, "Hub loop stopped");
    }

    fn handle(&mut self, event: HubEvent) {
        match event {
            HubEvent::Register { connection, ack } => {
                self.register(connection);
                let _ = ack.send(());
            }
            HubEvent::Unregister { connection, ack } => {
                self.unregister(connection.id());
                let _ = ack.send(());
            }
            HubEvent::Deliver(message) => self.deliver(message),
            HubEvent::Stats(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn register(&mut self, connection: Connection) {
        let id = connection.id();

        if let Entry::Vacant(slot) = self.members.entry(id) {
            slot.insert(connection.into_outbound());
            self.stats.registered += 1;
        }

        self.sink.trace(&[&"New client joined: ", &id]);
    }

    fn unregister(&mut self, id: ConnectionId) {
        if self.remove_and_close(id) {
            self.stats.unregistered += 1;
        }

        self.sink.trace(&[&"Client left: ", &id]);
    }

    fn deliver(&mut self, message: Message) {
        self.stats.messages += 1;
        self.sink.trace(&[&"Message received: ", &message]);

        let ids: Vec<ConnectionId> = self.members.keys().copied().collect();
        for id in ids {
            let Some(queue) = self.members.get(&id) else {
                continue;
            };

            match queue.try_enqueue(message.clone()) {
                Ok(()) => {
                    self.stats.delivered += 1;
                    self.sink.trace(&[&" -- sent to client ", &id]);
                }
                Err(reason) => {
                    if self.remove_and_close(id) {
                        self.stats.dropped += 1;
                    }

                    tracing::debug!(connection_id = %id, reason = %reason, "Dropping slow client");
                    self.sink.trace(&[
                        &" -- failed to send (",
                        &reason,
                        &"), cleaning up client ",
                        &id,
                    ]);
                }
            }
        }
    }

    /// The only place a member leaves the set or has its queue closed
    fn remove_and_close(&mut self, id: ConnectionId) -> bool {
        match self.members.remove(&id) {
            Some(queue) => {
                queue.close();
                true
            }
            None => false,
        }
    }

    fn snapshot(&self) -> HubStats {
        HubStats {
            connections: self.members.len(),
            ..self.stats
        }
    }
}
