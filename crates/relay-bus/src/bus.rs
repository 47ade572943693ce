//! The bus trait and its in-memory implementation.

use crate::consumer::{Consumer, RouteTable};
use crate::correlation::CorrelationId;
use crate::error::BusError;
use crate::message::{BusMessage, DeliveryOptions};
use crate::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_REQUEST_TIMEOUT};
use async_trait::async_trait;
use dashmap::DashMap;
use relay_wire::{ReplyEnvelope, WireValue};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Point-to-point request/reply transport.
///
/// The stub and dispatcher runtimes only ever talk to this trait; the
/// in-process implementation below is what single-node wiring and the test
/// suite use. Distributed deployments substitute their own.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Send a request to `address` and await its reply.
    ///
    /// Suspends until the consumer replies, the timeout from `options`
    /// (or the bus default) expires, or delivery fails. Exactly one of
    /// those happens; there is no retry.
    async fn request(
        &self,
        address: &str,
        body: WireValue,
        options: DeliveryOptions,
    ) -> Result<ReplyEnvelope, BusError>;

    /// Register the consumer for `address`.
    ///
    /// At most one consumer per address; a second registration fails with
    /// [`BusError::AddressInUse`].
    fn consumer(&self, address: &str) -> Result<Consumer, BusError>;

    /// Remove the route for `address`, if any. Returns whether one existed.
    fn unregister(&self, address: &str) -> bool;
}

/// Delivery counters for an [`InMemoryBus`].
#[derive(Debug, Default)]
pub struct BusStats {
    /// Requests handed to a consumer channel.
    pub requests_sent: AtomicU64,
    /// Replies that made it back to a requester.
    pub replies_received: AtomicU64,
    /// Requests that hit the reply deadline.
    pub timeouts: AtomicU64,
}

/// In-memory implementation of the bus.
///
/// One bounded mpsc channel per registered address; the reply slot is a
/// oneshot carried inside each [`BusMessage`]. Suitable for single-process
/// wiring and tests.
pub struct InMemoryBus {
    routes: RouteTable,
    capacity: usize,
    default_timeout: Duration,
    stats: BusStats,
}

impl InMemoryBus {
    /// Create a bus with default capacity and reply timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with a specific per-consumer channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            routes: Arc::new(DashMap::new()),
            capacity,
            default_timeout: DEFAULT_REQUEST_TIMEOUT,
            stats: BusStats::default(),
        }
    }

    /// Override the reply deadline used when options carry no timeout.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Number of registered addresses.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.routes.len()
    }

    /// Delivery counters.
    #[must_use]
    pub fn stats(&self) -> &BusStats {
        &self.stats
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn request(
        &self,
        address: &str,
        body: WireValue,
        options: DeliveryOptions,
    ) -> Result<ReplyEnvelope, BusError> {
        let sender = self
            .routes
            .get(address)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BusError::NoConsumer(address.to_owned()))?;

        let correlation_id = CorrelationId::new();
        let (reply_tx, reply_rx) = oneshot::channel();
        let msg = BusMessage::new(
            address.to_owned(),
            options.headers().clone(),
            body,
            correlation_id,
            reply_tx,
        );

        sender
            .send(msg)
            .await
            .map_err(|_| BusError::SendFailed(format!("consumer channel closed for {address}")))?;
        self.stats.requests_sent.fetch_add(1, Ordering::Relaxed);

        debug!(
            address = %address,
            correlation_id = %correlation_id,
            "Request delivered"
        );

        let timeout = options.timeout().unwrap_or(self.default_timeout);
        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(reply)) => {
                self.stats.replies_received.fetch_add(1, Ordering::Relaxed);
                Ok(reply)
            }
            Ok(Err(_)) => {
                warn!(
                    address = %address,
                    correlation_id = %correlation_id,
                    "Consumer dropped message without replying"
                );
                Err(BusError::ReplyDropped)
            }
            Err(_) => {
                self.stats.timeouts.fetch_add(1, Ordering::Relaxed);
                warn!(
                    address = %address,
                    correlation_id = %correlation_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "No reply within delivery timeout"
                );
                Err(BusError::Timeout)
            }
        }
    }

    fn consumer(&self, address: &str) -> Result<Consumer, BusError> {
        use dashmap::mapref::entry::Entry;

        match self.routes.entry(address.to_owned()) {
            Entry::Occupied(_) => Err(BusError::AddressInUse(address.to_owned())),
            Entry::Vacant(vacant) => {
                let (tx, rx) = mpsc::channel(self.capacity);
                vacant.insert(tx.clone());
                debug!(address = %address, "Consumer registered");
                Ok(Consumer::new(
                    address.to_owned(),
                    tx,
                    rx,
                    Arc::clone(&self.routes),
                ))
            }
        }
    }

    fn unregister(&self, address: &str) -> bool {
        let removed = self.routes.remove(address).is_some();
        if removed {
            debug!(address = %address, "Consumer unregistered");
        }
        removed
    }
}
