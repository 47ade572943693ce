//! The failure record carried in failure replies.

use crate::marshal::WireError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Well-known fault codes.
pub mod codes {
    /// Protocol violations and uncaught handler failures.
    pub const INTERNAL: i32 = 500;
}

/// A service-side failure, sent back to the caller in place of a result.
///
/// Mirrors the wire shape `{ code, message }`. Protocol-level faults use the
/// fixed constructors below so both sides agree on the exact message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("service fault {code}: {message}")]
pub struct ServiceFault {
    pub code: i32,
    pub message: String,
}

impl ServiceFault {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The request carried no `action` header.
    pub fn action_not_specified() -> Self {
        Self::new(codes::INTERNAL, "action not specified")
    }

    /// The action does not name a method of the bound service.
    pub fn invalid_action(action: &str) -> Self {
        Self::new(codes::INTERNAL, format!("Invalid action: {action}"))
    }

    /// An uncaught failure inside message handling.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, message)
    }
}

impl From<WireError> for ServiceFault {
    fn from(err: WireError) -> Self {
        Self::internal(err.to_string())
    }
}
