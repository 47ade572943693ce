//! Bus delivery errors.

use thiserror::Error;

/// A request could not be delivered or produced no reply.
///
/// No variant is retried anywhere in this workspace; retry policy belongs
/// to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// No consumer is registered at the address.
    #[error("no consumer registered at address: {0}")]
    NoConsumer(String),

    /// A consumer is already registered at the address.
    #[error("address already in use: {0}")]
    AddressInUse(String),

    /// The consumer's channel rejected the message.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// The consumer went away without producing a reply.
    #[error("consumer dropped the message without replying")]
    ReplyDropped,

    /// No reply arrived within the delivery timeout.
    #[error("timed out waiting for reply")]
    Timeout,
}
