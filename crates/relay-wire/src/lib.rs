//! # Relay Wire - Marshaling Contract for Service Proxies
//!
//! The plain-data crate shared by every other member of the workspace.
//! It defines:
//!
//! - The closed set of wire-representable types ([`TypeKind`]) and the
//!   encode/decode rules between native values and the JSON wire value,
//!   including the narrowing rules for `Byte` and `Short`.
//! - The request/reply envelopes exchanged over the bus
//!   ([`RequestEnvelope`], [`ReplyEnvelope`]) and the failure record
//!   carried in failure replies ([`ServiceFault`]).
//! - The service descriptor model ([`ServiceDescriptor`]) consumed by the
//!   proxy generator.
//!
//! This crate is pure data: no I/O, no async, no runtime state.

pub mod descriptor;
pub mod envelope;
pub mod fault;
pub mod marshal;
pub mod types;

// Re-export main types
pub use descriptor::{
    DescriptorError, MethodDescriptor, ParameterDescriptor, ServiceDescriptor,
};
pub use envelope::{ReplyEnvelope, RequestEnvelope};
pub use fault::{codes, ServiceFault};
pub use marshal::{
    decode_array, decode_bool, decode_byte, decode_f32, decode_f64, decode_i32, decode_i64,
    decode_object, decode_short, decode_string, decode_value, encode_array, encode_bool,
    encode_byte, encode_f32, encode_f64, encode_i32, encode_i64, encode_object, encode_short,
    encode_string, get_array, get_bool, get_byte, get_f32, get_f64, get_i32, get_i64, get_object,
    get_short, get_string, WireError,
};
pub use types::TypeKind;

/// The transport-representable encoding of a native value.
pub type WireValue = serde_json::Value;

/// The body of a request envelope: parameter name to wire value.
pub type Body = serde_json::Map<String, WireValue>;
