//! # Relay Proxy - Client Stub Core and Server Dispatcher
//!
//! The runtime half of the proxy pair. Generated code is thin; everything
//! shared lives here:
//!
//! - [`ClientProxy`] - the send-and-await core every generated stub method
//!   delegates to. Tags the request with its action header, suspends until
//!   the reply arrives, and surfaces remote failures as [`ProxyError`].
//! - [`ServiceAdapter`] - the trait generated dispatch glue implements:
//!   a closed action set plus the decode/invoke/encode step for each
//!   method.
//! - [`Dispatcher`] - binds an adapter to a bus address, validates the
//!   action tag of every message, schedules each invocation as its own
//!   task, and owns the idle-timeout lifecycle.
//!
//! ## Reply discipline
//!
//! Every accepted request produces exactly one reply. Protocol violations
//! (missing or unknown action) are answered on the receipt path with a
//! code-500 failure; recognized actions are answered from the spawned
//! invocation, success or failure. The reply slot travels with the message,
//! so a dispatcher that closes mid-invocation does not orphan the exchange.

pub mod adapter;
pub mod client;
pub mod dispatcher;
pub mod error;

// Re-export main types
pub use adapter::ServiceAdapter;
pub use client::ClientProxy;
pub use dispatcher::{Dispatcher, DispatcherConfig, DispatcherStats, NEVER_EXPIRE};
pub use error::{DispatcherError, ProxyError};

/// Header naming the method a request invokes.
pub const ACTION_HEADER: &str = "action";
