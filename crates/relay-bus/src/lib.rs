//! # Relay Bus - Address-Routed Request/Reply Delivery
//!
//! A point-to-point message bus: one consumer per address, bounded
//! delivery, and a reply slot carried inside every message.
//!
//! ```text
//! ┌──────────────┐   request(addr, body)    ┌──────────────┐
//! │   Requester  │ ───────────────────────→ │   Consumer   │
//! │              │ ←─────────────────────── │   (at addr)  │
//! └──────────────┘    msg.reply(envelope)   └──────────────┘
//! ```
//!
//! The requester suspends until the reply arrives, the per-call timeout
//! expires, or the consumer goes away. Exactly-once reply is structural:
//! [`BusMessage::reply`] consumes the message, so a handler cannot reply
//! twice, and a dropped message surfaces to the requester as
//! [`BusError::ReplyDropped`].
//!
//! Retry, addressing beyond the in-process route table, and multi-consumer
//! delivery are out of scope here; callers that need them bring their own
//! [`MessageBus`] implementation.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod bus;
pub mod consumer;
pub mod correlation;
pub mod error;
pub mod message;

// Re-export main types
pub use bus::{BusStats, InMemoryBus, MessageBus};
pub use consumer::{Consumer, MessageStream};
pub use correlation::CorrelationId;
pub use error::BusError;
pub use message::{BusMessage, DeliveryOptions};

/// Maximum messages buffered per consumer before sends wait.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Reply deadline applied when delivery options carry no timeout.
pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
