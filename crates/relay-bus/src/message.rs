//! Delivery options and the message handed to consumers.

use crate::correlation::CorrelationId;
use relay_wire::{Body, ReplyEnvelope, WireValue};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::oneshot;

/// Per-send configuration: headers plus an optional reply timeout.
///
/// Supplied by the wiring layer that owns the stub or dispatcher; the
/// proxy runtime only ever adds the `action` header on top.
#[derive(Debug, Clone, Default)]
pub struct DeliveryOptions {
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl DeliveryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style header addition.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Builder-style reply timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a header in place, replacing any previous value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// A delivered request, owning the one reply slot for its exchange.
///
/// `reply` consumes the message: a consumer can reply at most once, and the
/// requester observes a dropped message as [`crate::BusError::ReplyDropped`].
#[derive(Debug)]
pub struct BusMessage {
    address: String,
    headers: HashMap<String, String>,
    body: WireValue,
    correlation_id: CorrelationId,
    reply_tx: oneshot::Sender<ReplyEnvelope>,
}

impl BusMessage {
    pub(crate) fn new(
        address: String,
        headers: HashMap<String, String>,
        body: WireValue,
        correlation_id: CorrelationId,
        reply_tx: oneshot::Sender<ReplyEnvelope>,
    ) -> Self {
        Self {
            address,
            headers,
            body,
            correlation_id,
            reply_tx,
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn body(&self) -> &WireValue {
        &self.body
    }

    /// The body viewed as a parameter map, if it is one.
    #[must_use]
    pub fn body_object(&self) -> Option<&Body> {
        self.body.as_object()
    }

    #[must_use]
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Send the reply for this message.
    ///
    /// Returns `false` if the requester is no longer waiting (it timed out
    /// or was dropped); the reply is discarded in that case.
    pub fn reply(self, reply: ReplyEnvelope) -> bool {
        self.reply_tx.send(reply).is_ok()
    }
}
