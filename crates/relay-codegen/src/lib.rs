//! # Relay Codegen - Matched Proxy Pair Generation
//!
//! Turns a [`relay_wire::ServiceDescriptor`] into two pieces of Rust
//! source text:
//!
//! - a client stub (`<Service>Client`) whose methods marshal their
//!   arguments and delegate to `relay_proxy::ClientProxy`, and
//! - a dispatch adapter (`<Service>Dispatch`) implementing
//!   `relay_proxy::ServiceAdapter` with one match arm per method.
//!
//! Both sides are emitted from the same descriptor walk, so the action
//! tags, parameter names, and marshaling expressions cannot drift apart.
//! Output is deterministic: the same descriptor always produces
//! byte-identical text.
//!
//! Writing the text to a file or compilation unit is the caller's
//! business; generation ends at the returned strings.

pub mod generator;

// Re-export main types
pub use generator::{GeneratedPair, GenerationError, ProxyGenerator};
