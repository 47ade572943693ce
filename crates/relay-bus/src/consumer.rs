//! The receiving side of an address registration.

use crate::message::BusMessage;
use dashmap::DashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::debug;

pub(crate) type RouteTable = Arc<DashMap<String, mpsc::Sender<BusMessage>>>;

/// A registration handle receiving the messages sent to one address.
///
/// Dropping the consumer (or calling [`crate::MessageBus::unregister`])
/// removes the route; requests to the address fail with
/// [`crate::BusError::NoConsumer`] afterwards. Messages already delivered
/// keep their reply slots and can still be answered.
#[derive(Debug)]
pub struct Consumer {
    address: String,
    /// Identity probe so drop only removes our own registration.
    tx: mpsc::Sender<BusMessage>,
    rx: mpsc::Receiver<BusMessage>,
    routes: RouteTable,
}

impl Consumer {
    pub(crate) fn new(
        address: String,
        tx: mpsc::Sender<BusMessage>,
        rx: mpsc::Receiver<BusMessage>,
        routes: RouteTable,
    ) -> Self {
        Self {
            address,
            tx,
            rx,
            routes,
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Receive the next message for this address.
    ///
    /// Returns `None` once the route has been removed and every in-flight
    /// message has been drained.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        self.rx.recv().await
    }

    /// Wrap this consumer into a [`Stream`] of messages.
    #[must_use]
    pub fn into_stream(self) -> MessageStream {
        MessageStream { inner: self }
    }
}

impl Drop for Consumer {
    fn drop(&mut self) {
        self.routes
            .remove_if(&self.address, |_, tx| tx.same_channel(&self.tx));
        debug!(address = %self.address, "Consumer dropped");
    }
}

/// A stream wrapper for consumers.
pub struct MessageStream {
    inner: Consumer,
}

impl Stream for MessageStream {
    type Item = BusMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.rx.poll_recv(cx)
    }
}
