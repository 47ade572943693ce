//! The send-and-await core shared by all generated client stubs.

use crate::error::ProxyError;
use crate::ACTION_HEADER;
use relay_bus::{DeliveryOptions, MessageBus};
use relay_wire::{Body, ReplyEnvelope, WireValue};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Per-interface client state: bus handle, target address, delivery
/// options, and the closed flag.
///
/// Generated stub methods marshal their arguments into a [`Body`] and call
/// [`invoke`](Self::invoke); everything else - the action header, the
/// suspension, failure mapping - is handled here once.
pub struct ClientProxy {
    bus: Arc<dyn MessageBus>,
    address: String,
    options: DeliveryOptions,
    closed: AtomicBool,
}

impl ClientProxy {
    pub fn new(
        bus: Arc<dyn MessageBus>,
        address: impl Into<String>,
        options: DeliveryOptions,
    ) -> Self {
        Self {
            bus,
            address: address.into(),
            options,
            closed: AtomicBool::new(false),
        }
    }

    /// Send one marshaled call and await its reply.
    ///
    /// Fails fast with [`ProxyError::Closed`] if the stub was closed -
    /// nothing reaches the bus in that case. Otherwise the configured
    /// options are sent with the `action` header set to the method name,
    /// and the caller suspends until a reply or delivery failure.
    pub async fn invoke(&self, action: &str, body: Body) -> Result<WireValue, ProxyError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ProxyError::Closed);
        }

        let mut options = self.options.clone();
        options.set_header(ACTION_HEADER, action);

        debug!(address = %self.address, action = %action, "Invoking service method");

        let reply = self
            .bus
            .request(&self.address, WireValue::Object(body), options)
            .await?;

        match reply {
            ReplyEnvelope::Success(value) => Ok(value),
            ReplyEnvelope::Failure(fault) => Err(ProxyError::Remote(fault)),
        }
    }

    /// Mark the stub closed. Idempotent; subsequent calls fail fast.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}
