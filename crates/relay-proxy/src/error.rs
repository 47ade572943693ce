//! Proxy runtime errors.

use relay_bus::BusError;
use relay_wire::{ServiceFault, WireError};
use thiserror::Error;

/// A stub call failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// The stub was closed before the call; nothing was sent.
    #[error("proxy is closed")]
    Closed,

    /// The service replied with a failure; code and message are the
    /// remote fault's.
    #[error("remote failure: {0}")]
    Remote(ServiceFault),

    /// The transport could not deliver the request or no reply arrived.
    #[error("delivery failed: {0}")]
    Delivery(#[from] BusError),

    /// The success reply could not be decoded into the return type.
    #[error("reply decode failed: {0}")]
    Decode(#[from] WireError),
}

/// A dispatcher could not be installed.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// The idle timeout is neither `-1` nor a positive number of seconds.
    #[error("invalid idle timeout: {0} (expected -1 or a positive number of seconds)")]
    InvalidTimeout(i64),

    /// The bus rejected the registration.
    #[error(transparent)]
    Bus(#[from] BusError),
}
